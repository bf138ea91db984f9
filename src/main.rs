//! Assistant relay service entry point.

use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use assistant_relay::adapters::assistant::{AssistantRestClient, AssistantRestConfig};
use assistant_relay::adapters::http::{channels_router, tools_router, ChannelsAppState, ToolsAppState};
use assistant_relay::adapters::notify::ConversationNotifier;
use assistant_relay::adapters::platform::{PlatformRestClient, PlatformRestConfig};
use assistant_relay::application::handlers::{
    CleanAttributesHandler, DispatchResponseHandler, HandoverConfig, HandoverHandler,
    RouteMessageHandler, SendTemplatedMessageHandler, SendToAssistantHandler,
};
use assistant_relay::config::AppConfig;
use assistant_relay::ports::{AssistantClient, ConversationPlatform, UserNotifier};
use assistant_relay::security::CallbackSigner;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("fatal: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    let platform: Arc<dyn ConversationPlatform> = Arc::new(PlatformRestClient::new(
        PlatformRestConfig::new(
            config.platform.account_sid.clone(),
            config.platform.auth_token.clone(),
            config.platform.api_base_url.clone(),
        )
        .with_request_timeout(request_timeout),
    ));
    let assistant: Arc<dyn AssistantClient> = Arc::new(AssistantRestClient::new(
        AssistantRestConfig::new(
            config.platform.account_sid.clone(),
            config.platform.auth_token.clone(),
            config.assistant.api_base_url.clone(),
        )
        .with_request_timeout(request_timeout),
    ));
    let notifier: Arc<dyn UserNotifier> = Arc::new(ConversationNotifier::new(
        platform.clone(),
        config.handover.notify_sender.clone(),
    ));

    let signer = CallbackSigner::new(
        config.assistant.signing_secret.clone(),
        config.assistant.token_ttl_secs,
    );

    let channels_state = ChannelsAppState {
        route_message: Arc::new(RouteMessageHandler::new(
            platform.clone(),
            assistant.clone(),
            signer.clone(),
            config.assistant.default_assistant_sid.clone(),
            config.assistant.callback_base_url.clone(),
        )),
        dispatch_response: Arc::new(DispatchResponseHandler::new(
            platform.clone(),
            signer.clone(),
            config.assistant.apology_message.clone(),
        )),
        send_to_assistant: Arc::new(SendToAssistantHandler::new(
            platform.clone(),
            assistant,
            signer,
            config.assistant.callback_base_url.clone(),
        )),
        clean_attributes: Arc::new(CleanAttributesHandler::new(platform.clone())),
    };

    let tools_state = ToolsAppState {
        send_templated_message: Arc::new(SendTemplatedMessageHandler::new(platform.clone())),
        handover: Arc::new(HandoverHandler::new(
            platform,
            notifier,
            HandoverConfig {
                default_flow_sid: config.handover.default_flow_sid.clone(),
                known_services: config.handover.services_list(),
                known_areas: config.handover.areas_list(),
            },
        )),
    };

    let app = axum::Router::new()
        .merge(channels_router().with_state(channels_state))
        .merge(tools_router().with_state(tools_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        );

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "assistant relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
