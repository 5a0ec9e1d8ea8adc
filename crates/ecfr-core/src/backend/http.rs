use super::{BackendFuture, DashboardBackend, decode_titles};
use crate::{Config, CoreError, CorrectionDataset, Endpoints, Service, TitleNumber, TitleRecord};

/// [`DashboardBackend`] talking to the real services over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoints: config.endpoints.clone(),
        })
    }

    async fn get_text(&self, service: Service, url: &str) -> Result<String, CoreError> {
        tracing::debug!(%service, url, "GET");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Status {
                service,
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }
}

impl DashboardBackend for HttpBackend {
    fn list_titles(&self) -> BackendFuture<'_, Vec<TitleRecord>> {
        Box::pin(async move {
            let body = self
                .get_text(Service::Registry, &self.endpoints.registry_url)
                .await?;
            decode_titles(body.as_bytes())
        })
    }

    fn acquire(&self, number: TitleNumber) -> BackendFuture<'_, ()> {
        Box::pin(async move {
            let url = self.endpoints.acquisition_for(number);
            // Only the status matters; the body is ignored.
            self.get_text(Service::Acquisition, &url).await?;
            Ok(())
        })
    }

    fn corrections(&self, number: TitleNumber) -> BackendFuture<'_, CorrectionDataset> {
        Box::pin(async move {
            let url = self.endpoints.corrections_for(number);
            let body = self.get_text(Service::Corrections, &url).await?;
            CorrectionDataset::from_json(number, body.as_bytes())
        })
    }
}
