use crate::settings::Redis;
use anyhow::{Context, anyhow};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::time::Duration;
use tracing::{debug, info};

/// Opens a managed connection and checks it with PING before handing it out.
/// Startup gives up once the connect and response timeouts have both elapsed
/// instead of waiting on the manager's reconnect backoff.
pub async fn connect(settings: &Redis) -> anyhow::Result<ConnectionManager> {
    info!(
        host = %settings.host,
        port = settings.port,
        db = settings.db,
        "connecting to redis"
    );

    let client =
        redis::Client::open(connection_info(settings)).context("invalid redis settings")?;
    let config = ConnectionManagerConfig::new()
        .set_connection_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .set_response_timeout(Duration::from_millis(settings.response_timeout_ms));

    let startup = async {
        let mut manager = client
            .get_connection_manager_with_config(config)
            .await
            .context("redis is unreachable")?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .context("redis PING failed")?;
        debug!("PING -> {}", pong);
        anyhow::Ok(manager)
    };

    tokio::time::timeout(startup_deadline(settings), startup)
        .await
        .map_err(|_| {
            anyhow!(
                "redis at {}:{} did not answer within {:?}",
                settings.host,
                settings.port,
                startup_deadline(settings)
            )
        })?
}

fn startup_deadline(settings: &Redis) -> Duration {
    Duration::from_millis(
        settings
            .connect_timeout_ms
            .saturating_add(settings.response_timeout_ms),
    )
}

fn connection_info(settings: &Redis) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(settings.host.clone(), settings.port),
        redis: RedisConnectionInfo {
            db: settings.db,
            password: settings.password.clone().filter(|p| !p.is_empty()),
            ..Default::default()
        },
    }
}
