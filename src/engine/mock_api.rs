//! `mockall` double for [`EngineApi`] shared by the unit tests.

use bollard::models::{ContainerCreateBody, ContainerCreateResponse};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, RemoveContainerOptions, StopContainerOptions,
};
use mockall::mock;

use super::api::{EngineApi, EngineFuture, PullProgressStream};

mock! {
    #[derive(Debug)]
    pub Api {}

    impl EngineApi for Api {
        fn ping(&self) -> EngineFuture<'_, ()>;
        fn create_image(&self, options: CreateImageOptions) -> PullProgressStream<'_>;
        fn create_container(
            &self,
            options: Option<CreateContainerOptions>,
            config: ContainerCreateBody,
        ) -> EngineFuture<'_, ContainerCreateResponse>;
        fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()>;
        fn stop_container(
            &self,
            container_id: &str,
            options: StopContainerOptions,
        ) -> EngineFuture<'_, ()>;
        fn remove_container(
            &self,
            container_id: &str,
            options: RemoveContainerOptions,
        ) -> EngineFuture<'_, ()>;
    }
}

/// Engine error carrying an HTTP status, as `bollard` reports daemon refusals.
pub(crate) fn server_error(status_code: u16, message: &str) -> bollard::errors::Error {
    bollard::errors::Error::DockerResponseServerError {
        status_code,
        message: String::from(message),
    }
}
