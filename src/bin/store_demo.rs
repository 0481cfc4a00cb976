//! Walks one login through the whole record lifecycle against the configured backend.
//!
//! $ cargo run --bin store_demo -- --settings=settings/dev.toml

use nanoid::nanoid;
use vcode_store::context::StoreContext;
use vcode_store::domain_port::VerificationStoreError;
use vcode_store::logger::*;
use vcode_store::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let context = StoreContext::try_new(&project_settings).await?;
    let store = context.store;

    let alphabet: [char; 16] = [
        '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
    ];
    let login = format!("demo-{}", nanoid!(10, &alphabet));

    store.create(&login, "121", 5).await?;

    match store.create(&login, "321", 5).await {
        Err(VerificationStoreError::LoginExists) => println!("exists"),
        Err(e) => return Err(e.into()),
        Ok(()) => return Err(anyhow::anyhow!("second create succeeded")),
    }

    for _ in 0..8 {
        store.increment_retry(&login).await?;
    }

    let record = store.read(&login).await?;
    println!("{}", record);

    store.delete(&login).await?;

    match store.read(&login).await {
        Err(VerificationStoreError::LoginNotFound) => println!("deleted"),
        other => return Err(anyhow::anyhow!("unexpected read after delete: {:?}", other)),
    }

    Ok(())
}
