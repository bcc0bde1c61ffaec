use scubex::config::ScubexConfig;
use scubex::server;

use crate::arguments::ServeOptions;

pub(crate) async fn species_service(
    options: &ServeOptions,
    config: &ScubexConfig,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(listen) = &options.listen {
        config.listen_addr = listen.clone();
    }

    server::serve(&config).await?;
    Ok(())
}
