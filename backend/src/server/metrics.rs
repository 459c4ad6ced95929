//! Request metrics middleware that can be switched off at runtime.
//!
//! `App::wrap` needs one concrete middleware type, so both the Prometheus and
//! the pass-through branches are boxed behind the same service type.

use std::sync::Arc;

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;

type BoxedApp = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

#[derive(Clone)]
pub(crate) struct MetricsLayer {
    prometheus: Option<Arc<PrometheusMetrics>>,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        Self {
            prometheus: metrics.map(Arc::new),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedApp;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(prometheus) = self.prometheus.clone() else {
            let passthrough = service.map(ServiceResponse::map_into_boxed_body);
            return Box::pin(async move { Ok(boxed::service(passthrough)) });
        };
        let pending = Compat::new((*prometheus).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(pending.await?)) })
    }
}
