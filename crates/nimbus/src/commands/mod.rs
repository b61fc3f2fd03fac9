pub mod softlayer;
pub mod vcloud;

use nimbus_cloud::HttpTransport;
use std::sync::Arc;

pub(crate) fn transport() -> anyhow::Result<Arc<HttpTransport>> {
    Ok(Arc::new(HttpTransport::new()?))
}
