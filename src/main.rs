use slack_notif::alert::ConsoleSink;
use slack_notif::config::{Settings, load_settings};
use slack_notif::error::Result;
use slack_notif::logging;
use slack_notif::metadata::IdentityCache;
use slack_notif::slack::{RtmStream, SlackClient, StreamDispatcher, StreamOutcome, owner_policy};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let settings = load_settings();
    logging::init(settings.as_ref().is_ok_and(|s| s.log.json));

    let result = match settings {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            logging::log_error("slack_notif", &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<ExitCode> {
    tracing::info!("🚀 Starting Slack notifier");
    tracing::debug!(
        watch_channel = %settings.watch.channel,
        watch_keyword = %settings.watch.keyword,
        "Configuration loaded"
    );

    let slack_client = SlackClient::new(settings.slack)?;
    let owner_id = slack_client.token_owner_id().await?;

    let cache = Arc::new(IdentityCache::new(slack_client));

    let policy = owner_policy(&cache, &owner_id, settings.watch).await?;

    let url = cache.directory().rtm_connect().await?;
    let mut stream = RtmStream::connect(&url, cache.directory().config()).await?;

    let mut dispatcher = StreamDispatcher::new(cache.clone(), policy, ConsoleSink::stdout());

    let code = tokio::select! {
        result = dispatcher.run(&mut stream) => match result? {
            StreamOutcome::Closed => ExitCode::SUCCESS,
            StreamOutcome::Errored(cause) => {
                tracing::error!(error = %cause, "Stream ended with an error");
                ExitCode::FAILURE
            }
        },
        signal_name = shutdown_signal() => {
            let signal_name = signal_name?;
            tracing::info!(signal = %signal_name, "Received shutdown signal");
            ExitCode::SUCCESS
        }
    };

    cache.log_stats().await;
    Ok(code)
}

/// Wait for SIGINT (Ctrl+C) or, on Unix, SIGTERM
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                Ok("SIGINT (Ctrl+C)")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        Ok("Ctrl+C")
    }
}
