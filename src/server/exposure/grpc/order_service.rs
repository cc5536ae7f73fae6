//! gRPC endpoints of the order workflow

use super::convert;
use super::proto::{
    self, manage_order_service_server::ManageOrderService,
    read_order_service_server::ReadOrderService,
};
use crate::core::ComexError;
use crate::orders::OrderService;
use tonic::{Request, Response, Status};

/// Create, update and delete orders
pub struct ManageOrderServiceImpl {
    service: OrderService,
}

impl ManageOrderServiceImpl {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ManageOrderService for ManageOrderServiceImpl {
    async fn create(
        &self,
        request: Request<proto::NewOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let new_order = convert::new_order(request.into_inner()).map_err(ComexError::from)?;
        let order = self.service.create(new_order).await?;
        Ok(Response::new(order.into()))
    }

    async fn update(
        &self,
        request: Request<proto::UpdateOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let changes = convert::update_order(request.into_inner()).map_err(ComexError::from)?;
        let order = self.service.update(changes).await?;
        Ok(Response::new(order.into()))
    }

    async fn update_obs(
        &self,
        request: Request<proto::UpdateObsOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let order = self
            .service
            .update_observation(request.into_inner().into())
            .await?;
        Ok(Response::new(order.into()))
    }

    async fn update_ref(
        &self,
        request: Request<proto::UpdateRefOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let order = self
            .service
            .update_reference(request.into_inner().into())
            .await?;
        Ok(Response::new(order.into()))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let order = self.service.delete(&request.into_inner().id).await?;
        Ok(Response::new(order.into()))
    }
}

/// Paged, filtered order reads
pub struct ReadOrderServiceImpl {
    service: OrderService,
}

impl ReadOrderServiceImpl {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ReadOrderService for ReadOrderServiceImpl {
    async fn read(
        &self,
        request: Request<proto::ReadOrderRequest>,
    ) -> Result<Response<proto::OrdersResponse>, Status> {
        let request = request.into_inner();
        let page = convert::page_request(request.pageable).map_err(ComexError::from)?;
        let orders = self
            .service
            .read(convert::order_search(request.search_order), &page)
            .await?;
        Ok(Response::new(orders.into()))
    }
}
