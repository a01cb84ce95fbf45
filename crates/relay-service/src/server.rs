//! HTTP server for the order relay API.
//!
//! This module exposes the intake surface consumed by the storefront
//! mini-app plus the operator admin queries, translating engine errors into
//! the wire error taxonomy. Delivery failures never surface here; an
//! operation reports success as soon as its state mutation committed.

use axum::{
	extract::{Query, State},
	http::{header, HeaderValue, Method},
	response::Json,
	routing::{get, post},
	Router,
};
use relay_config::Config;
use relay_core::{EngineError, OrderEngine};
use relay_types::{
	AckResponse, ApiError, BtcClaimRequest, CreateOrderRequest, CreateOrderResponse,
	ListOrdersQuery, ListOrdersResponse, PaymentMethod, UpdateStatusRequest,
	UpdateStatusResponse, VoucherClaimRequest,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the lifecycle engine for processing requests.
	pub engine: Arc<OrderEngine>,
}

/// Starts the HTTP server for the intake API.
pub async fn start_server(
	config: Config,
	engine: Arc<OrderEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	let app = Router::new()
		.route("/", get(handle_root))
		.route("/health", get(handle_health))
		.nest(
			"/api",
			Router::new()
				.route("/create-order", post(handle_create_order))
				.route("/client-paid-btc", post(handle_btc_claim))
				.route("/submit-transcash", post(handle_voucher_claim))
				.route("/update-status", post(handle_update_status))
				.route("/orders", get(handle_list_orders)),
		)
		.layer(ServiceBuilder::new().layer(cors_layer(&config.api.cors_origin)?))
		.with_state(app_state);

	let bind_address = format!("{}:{}", config.api.host, config.api.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order relay API listening on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Builds the CORS layer from the configured origin.
fn cors_layer(origin: &str) -> Result<CorsLayer, Box<dyn std::error::Error>> {
	if origin == "*" {
		return Ok(CorsLayer::permissive());
	}
	let origin: HeaderValue = origin.parse()?;
	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::exact(origin))
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE]))
}

/// Translates engine errors into the wire taxonomy.
///
/// Internal detail stays server-side; the caller only sees a generic
/// message.
fn map_engine_error(error: EngineError) -> ApiError {
	match error {
		EngineError::InvalidInput(reason) => ApiError::InvalidInput(reason),
		EngineError::NotFound => ApiError::NotFound,
		EngineError::Unauthorized => ApiError::Unauthorized,
		EngineError::Internal(detail) => {
			tracing::error!(detail = %detail, "Internal error");
			ApiError::Internal
		},
	}
}

/// Handles GET / requests.
async fn handle_root() -> &'static str {
	"Order relay API OK"
}

/// Handles GET /health requests.
async fn handle_health() -> Json<AckResponse> {
	Json(AckResponse::ok())
}

/// Handles POST /api/create-order requests.
async fn handle_create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
	match state.engine.create_order(request).await {
		Ok(receipt) => Ok(Json(CreateOrderResponse {
			ok: true,
			order_code: receipt.order_code,
			btc_address: receipt.btc_address,
		})),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(map_engine_error(e))
		},
	}
}

/// Handles POST /api/client-paid-btc requests.
async fn handle_btc_claim(
	State(state): State<AppState>,
	Json(request): Json<BtcClaimRequest>,
) -> Result<Json<AckResponse>, ApiError> {
	match state
		.engine
		.record_claim(request.order_code, PaymentMethod::Btc, None, request.user)
		.await
	{
		Ok(()) => Ok(Json(AckResponse::ok())),
		Err(e) => {
			tracing::warn!("BTC claim failed: {}", e);
			Err(map_engine_error(e))
		},
	}
}

/// Handles POST /api/submit-transcash requests.
async fn handle_voucher_claim(
	State(state): State<AppState>,
	Json(request): Json<VoucherClaimRequest>,
) -> Result<Json<AckResponse>, ApiError> {
	match state
		.engine
		.record_claim(
			request.order_code,
			PaymentMethod::Voucher,
			request.code,
			request.user,
		)
		.await
	{
		Ok(()) => Ok(Json(AckResponse::ok())),
		Err(e) => {
			tracing::warn!("Voucher claim failed: {}", e);
			Err(map_engine_error(e))
		},
	}
}

/// Handles POST /api/update-status requests.
async fn handle_update_status(
	State(state): State<AppState>,
	Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
	match state.engine.apply_operator_status(request).await {
		Ok(order) => Ok(Json(UpdateStatusResponse { ok: true, order })),
		Err(e) => {
			tracing::warn!("Status update failed: {}", e);
			Err(map_engine_error(e))
		},
	}
}

/// Handles GET /api/orders requests (admin query).
async fn handle_list_orders(
	State(state): State<AppState>,
	Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
	match state
		.engine
		.list_orders(query.secret.as_deref(), query.limit)
		.await
	{
		Ok(orders) => Ok(Json(ListOrdersResponse { ok: true, orders })),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(map_engine_error(e))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_core::EngineSettings;
	use relay_delivery::DeliveryService;
	use relay_storage::implementations::memory::MemoryStore;
	use relay_types::{CustomerPayload, OrderLineItem, SecretString};
	use rust_decimal::Decimal;

	const SECRET: &str = "hunter2hunter2";

	fn test_state() -> AppState {
		let engine = OrderEngine::new(
			Arc::new(MemoryStore::new()),
			Arc::new(DeliveryService::disabled()),
			EngineSettings {
				btc_address: "bc1qtest".to_string(),
				operator_chat_id: None,
				operator_secret: Some(SecretString::from(SECRET)),
				list_default_limit: 10,
				list_max_limit: 50,
			},
		);
		AppState {
			engine: Arc::new(engine),
		}
	}

	fn truffle_request() -> CreateOrderRequest {
		CreateOrderRequest {
			user: Some(CustomerPayload {
				id: Some(42),
				username: Some("alice".to_string()),
			}),
			items: vec![OrderLineItem {
				product_id: None,
				name: "Truffle".to_string(),
				unit_price: Decimal::new(1250, 2),
				quantity: 2,
			}],
			total_eur: Decimal::new(2500, 2),
		}
	}

	#[tokio::test]
	async fn test_create_order_handler() {
		let state = test_state();

		let Json(response) = handle_create_order(State(state), Json(truffle_request()))
			.await
			.unwrap();
		assert!(response.ok);
		assert!(response.order_code.starts_with("CMD-"));
		assert_eq!(response.btc_address, "bc1qtest");
	}

	#[tokio::test]
	async fn test_create_order_validation_maps_to_400() {
		let state = test_state();

		let mut request = truffle_request();
		request.items.clear();
		let error = handle_create_order(State(state), Json(request))
			.await
			.unwrap_err();
		assert_eq!(error.status_code(), 400);
		assert_eq!(error.to_error_response().error, "Empty items");
	}

	#[tokio::test]
	async fn test_update_status_unknown_code_maps_to_404() {
		let state = test_state();

		let error = handle_update_status(
			State(state),
			Json(UpdateStatusRequest {
				order_code: Some("CMD-9999".to_string()),
				status: Some("PAID".to_string()),
				secret: Some(SECRET.to_string()),
			}),
		)
		.await
		.unwrap_err();
		assert_eq!(error.status_code(), 404);
		assert_eq!(error.to_error_response().error, "Order not found");
	}

	#[tokio::test]
	async fn test_update_status_bad_secret_maps_to_401() {
		let state = test_state();

		let error = handle_update_status(
			State(state),
			Json(UpdateStatusRequest {
				order_code: Some("CMD-9999".to_string()),
				status: Some("PAID".to_string()),
				secret: Some("wrong".to_string()),
			}),
		)
		.await
		.unwrap_err();
		assert_eq!(error.status_code(), 401);
	}

	#[tokio::test]
	async fn test_full_lifecycle_over_handlers() {
		let state = test_state();

		let Json(created) =
			handle_create_order(State(state.clone()), Json(truffle_request()))
				.await
				.unwrap();

		let Json(ack) = handle_btc_claim(
			State(state.clone()),
			Json(BtcClaimRequest {
				order_code: Some(created.order_code.clone()),
				user: None,
			}),
		)
		.await
		.unwrap();
		assert!(ack.ok);

		let Json(updated) = handle_update_status(
			State(state.clone()),
			Json(UpdateStatusRequest {
				order_code: Some(created.order_code.clone()),
				status: Some("SHIPPED".to_string()),
				secret: Some(SECRET.to_string()),
			}),
		)
		.await
		.unwrap();
		assert!(updated.ok);
		assert_eq!(updated.order.status.to_string(), "SHIPPED");

		let Json(listing) = handle_list_orders(
			State(state),
			Query(ListOrdersQuery {
				secret: Some(SECRET.to_string()),
				limit: None,
			}),
		)
		.await
		.unwrap();
		assert_eq!(listing.orders.len(), 1);
		assert_eq!(listing.orders[0].code, created.order_code);
	}

	#[test]
	fn test_cors_layer_accepts_wildcard_and_exact_origin() {
		assert!(cors_layer("*").is_ok());
		assert!(cors_layer("https://shop.example").is_ok());
	}
}
