use crate::{config, server};

pub async fn handle() -> anyhow::Result<()> {
    server::serve(config::config().clone()).await
}
