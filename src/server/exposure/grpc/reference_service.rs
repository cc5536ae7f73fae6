//! gRPC endpoints of the reference-data registries
//!
//! Each endpoint decodes the wire message, calls the matching service and
//! encodes the result. Errors go through `From<ComexError> for Status`.

use super::convert;
use super::proto::{
    self, delivery_place_service_server::DeliveryPlaceService,
    exporter_service_server::ExporterService, importer_service_server::ImporterService,
    material_service_server::MaterialService, operation_service_server::OperationService,
    point_service_server::PointService, process_service_server::ProcessService,
    user_service_server::UserService,
};
use crate::core::ComexError;
use crate::services;
use tonic::{Request, Response, Status};

pub struct ExporterServiceImpl {
    service: services::ExporterService,
}

impl ExporterServiceImpl {
    pub fn new(service: services::ExporterService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ExporterService for ExporterServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewExporterRequest>,
    ) -> Result<Response<proto::ExporterResponse>, Status> {
        let exporter = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(exporter.into()))
    }

    async fn read(
        &self,
        request: Request<proto::ReadExporterRequest>,
    ) -> Result<Response<proto::ExportersResponse>, Status> {
        let exporters = self.service.read(&request.into_inner().name).await?;
        Ok(Response::new(proto::ExportersResponse {
            exporters: exporters.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateExporterRequest>,
    ) -> Result<Response<proto::ExporterResponse>, Status> {
        let exporter = self.service.update(request.into_inner().into()).await?;
        Ok(Response::new(exporter.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteExporterRequest>,
    ) -> Result<Response<proto::ExporterResponse>, Status> {
        let exporter = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(exporter.into()))
    }
}

pub struct ImporterServiceImpl {
    service: services::ImporterService,
}

impl ImporterServiceImpl {
    pub fn new(service: services::ImporterService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ImporterService for ImporterServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewImporterRequest>,
    ) -> Result<Response<proto::ImporterResponse>, Status> {
        let importer = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(importer.into()))
    }

    async fn read(
        &self,
        request: Request<proto::ReadImporterRequest>,
    ) -> Result<Response<proto::ImportersResponse>, Status> {
        let importers = self.service.read(&request.into_inner().plant).await?;
        Ok(Response::new(proto::ImportersResponse {
            importers: importers.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateImporterRequest>,
    ) -> Result<Response<proto::ImporterResponse>, Status> {
        let importer = self.service.update(request.into_inner().into()).await?;
        Ok(Response::new(importer.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteImporterRequest>,
    ) -> Result<Response<proto::ImporterResponse>, Status> {
        let importer = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(importer.into()))
    }
}

pub struct MaterialServiceImpl {
    service: services::MaterialService,
}

impl MaterialServiceImpl {
    pub fn new(service: services::MaterialService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl MaterialService for MaterialServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewMaterialRequest>,
    ) -> Result<Response<proto::MaterialResponse>, Status> {
        let new_material = convert::new_material(request.into_inner())
            .map_err(ComexError::from)?;
        let material = self.service.create(new_material).await?;
        Ok(Response::new(material.into()))
    }

    async fn read(
        &self,
        request: Request<proto::ReadMaterialRequest>,
    ) -> Result<Response<proto::MaterialsResponse>, Status> {
        let request = request.into_inner();
        let page = convert::page_request(request.pageable).map_err(ComexError::from)?;
        let materials = self
            .service
            .read(convert::material_search(request.search_material), &page)
            .await?;
        Ok(Response::new(materials.into()))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateMaterialRequest>,
    ) -> Result<Response<proto::MaterialResponse>, Status> {
        let changes = convert::update_material(request.into_inner())
            .map_err(ComexError::from)?;
        let material = self.service.update(changes).await?;
        Ok(Response::new(material.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteMaterialRequest>,
    ) -> Result<Response<proto::MaterialResponse>, Status> {
        let material = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(material.into()))
    }
}

pub struct UserServiceImpl {
    service: services::UserService,
}

impl UserServiceImpl {
    pub fn new(service: services::UserService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let user = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(user.into()))
    }

    async fn read(
        &self,
        request: Request<proto::ReadUserRequest>,
    ) -> Result<Response<proto::UsersResponse>, Status> {
        let search = convert::user_search(request.into_inner().search_user);
        let users = self.service.read(search).await?;
        Ok(Response::new(proto::UsersResponse {
            users: users.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let user = self.service.update(request.into_inner().into()).await?;
        Ok(Response::new(user.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let user = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(user.into()))
    }
}

pub struct DeliveryPlaceServiceImpl {
    service: services::DeliveryPlaceService,
}

impl DeliveryPlaceServiceImpl {
    pub fn new(service: services::DeliveryPlaceService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl DeliveryPlaceService for DeliveryPlaceServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewDeliveryPlaceRequest>,
    ) -> Result<Response<proto::DeliveryPlaceResponse>, Status> {
        let place = self
            .service
            .create(services::delivery_place::NewDeliveryPlace {
                name: request.into_inner().name,
            })
            .await?;
        Ok(Response::new(place.into()))
    }

    async fn read(
        &self,
        _request: Request<proto::ReadDeliveryPlaceRequest>,
    ) -> Result<Response<proto::DeliveryPlacesResponse>, Status> {
        let places = self.service.read().await?;
        Ok(Response::new(proto::DeliveryPlacesResponse {
            delivery_places: places.into_iter().map(Into::into).collect(),
        }))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteDeliveryPlaceRequest>,
    ) -> Result<Response<proto::DeliveryPlaceResponse>, Status> {
        let place = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(place.into()))
    }
}

pub struct OperationServiceImpl {
    service: services::OperationService,
}

impl OperationServiceImpl {
    pub fn new(service: services::OperationService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl OperationService for OperationServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewOperationRequest>,
    ) -> Result<Response<proto::OperationResponse>, Status> {
        let operation = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(operation.into()))
    }

    async fn read(
        &self,
        _request: Request<proto::ReadOperationRequest>,
    ) -> Result<Response<proto::OperationsResponse>, Status> {
        let operations = self.service.read().await?;
        Ok(Response::new(proto::OperationsResponse {
            operations: operations.into_iter().map(Into::into).collect(),
        }))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteOperationRequest>,
    ) -> Result<Response<proto::OperationResponse>, Status> {
        let operation = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(operation.into()))
    }
}

pub struct ProcessServiceImpl {
    service: services::ProcessService,
}

impl ProcessServiceImpl {
    pub fn new(service: services::ProcessService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ProcessService for ProcessServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewProcessRequest>,
    ) -> Result<Response<proto::ProcessResponse>, Status> {
        let process = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(process.into()))
    }

    async fn read(
        &self,
        request: Request<proto::ReadProcessRequest>,
    ) -> Result<Response<proto::ProcessesResponse>, Status> {
        let processes = self.service.read(&request.into_inner().name).await?;
        Ok(Response::new(proto::ProcessesResponse {
            processes: processes.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateProcessRequest>,
    ) -> Result<Response<proto::ProcessResponse>, Status> {
        let process = self.service.update(request.into_inner().into()).await?;
        Ok(Response::new(process.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteProcessRequest>,
    ) -> Result<Response<proto::ProcessResponse>, Status> {
        let process = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(process.into()))
    }
}

pub struct PointServiceImpl {
    service: services::PointService,
}

impl PointServiceImpl {
    pub fn new(service: services::PointService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl PointService for PointServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewPointRequest>,
    ) -> Result<Response<proto::PointResponse>, Status> {
        let point = self.service.create(request.into_inner().into()).await?;
        Ok(Response::new(point.into()))
    }

    async fn read(
        &self,
        _request: Request<proto::ReadPointRequest>,
    ) -> Result<Response<proto::PointsResponse>, Status> {
        let points = self.service.read().await?;
        Ok(Response::new(proto::PointsResponse {
            points: points.into_iter().map(Into::into).collect(),
        }))
    }
}
