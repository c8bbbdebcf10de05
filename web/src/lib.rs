#![deny(missing_docs)]

//! # Apidriven Web Library
//!
//! A small users service whose routes, validation and OpenAPI document all
//! come from one set of endpoint contracts.

use actix_web::{get, web, HttpResponse, Responder};
use apidriven_core::{
    build_specification, delete, get as get_endpoint, post, ApiDocs, ApiModel, ApiRoutes,
    AppResult, EndpointCall, RoutesConfig, Schema,
};
use serde_json::Value;
use std::sync::Arc;

/// Data models.
pub mod models;

use models::users::{NewUser, User, UserStore};

/// The users API contracts.
pub fn users_api() -> AppResult<ApiModel> {
    let user = Schema::of::<User>()?;

    ApiModel::builder(ApiDocs::new("Users", env!("CARGO_PKG_VERSION")))
        .endpoint(
            "listUsers",
            get_endpoint("/users")
                .status(200)
                .query("name", Schema::string().optional())
                .response_body(Schema::array(user.clone()))
                .build()?,
        )
        .endpoint(
            "getUser",
            get_endpoint("/users/:userId")
                .status(200)
                .response_body(user.clone())
                .build()?,
        )
        .endpoint(
            "createUser",
            post("/users")
                .status(201)
                .request_body(Schema::of::<NewUser>()?.strict())
                .response_body(user)
                .build()?,
        )
        .endpoint(
            "deleteUser",
            delete("/users/:userId")
                .status(204)
                .header("X-Api-Key", Schema::string())
                .build()?,
        )
        .build()
}

/// Everything the service mounts, cheap to clone into each worker.
#[derive(Clone, Debug)]
pub struct UsersService {
    routes: ApiRoutes,
    store: web::Data<UserStore>,
    spec: web::Data<Value>,
}

impl UsersService {
    /// Builds the service over an empty store.
    pub fn new(config: RoutesConfig) -> AppResult<Self> {
        let api = Arc::new(users_api()?);
        let spec = build_specification(&api)?;

        let mut routes = ApiRoutes::with_config(api, config);
        routes.register("listUsers", list_users)?;
        routes.register("getUser", get_user)?;
        routes.register("createUser", create_user)?;
        routes.register("deleteUser", delete_user)?;

        Ok(Self {
            routes,
            store: web::Data::new(UserStore::new()),
            spec: web::Data::new(spec),
        })
    }

    /// The backing store.
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Mounts the health check, the OpenAPI document and the users routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.spec.clone())
            .service(health_check)
            .service(openapi_document);
        self.routes.configure(cfg);
    }
}

/// A simple health check handler.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Serves the generated OpenAPI document.
#[get("/openapi.json")]
pub async fn openapi_document(spec: web::Data<Value>) -> impl Responder {
    HttpResponse::Ok().json(spec.get_ref())
}

fn store_of(call: &EndpointCall) -> Result<web::Data<UserStore>, actix_web::Error> {
    call.request
        .app_data::<web::Data<UserStore>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("user store is not configured"))
}

fn user_id(call: &EndpointCall) -> &str {
    call.param("userId").and_then(Value::as_str).unwrap_or_default()
}

async fn list_users(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    let store = store_of(&call)?;
    let users = store.list(call.param("name").and_then(Value::as_str));
    Ok(call.respond(serde_json::to_value(users)?)?)
}

async fn get_user(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    let store = store_of(&call)?;
    match store.get(user_id(&call)) {
        Some(user) => Ok(call.respond(serde_json::to_value(user)?)?),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

async fn create_user(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    let store = store_of(&call)?;
    let new_user: NewUser = serde_json::from_value(call.request_body.clone())?;
    let user = store.insert(new_user);
    tracing::info!(user_id = %user.user_id, "created user");
    Ok(call.respond(serde_json::to_value(user)?)?)
}

async fn delete_user(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    let store = store_of(&call)?;
    if store.remove(user_id(&call)) {
        Ok(call.respond(())?)
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[::core::prelude::v1::test]
    fn test_users_api_contracts() {
        let api = users_api().unwrap();
        let ids: Vec<&str> = api.endpoints().keys().map(String::as_str).collect();
        assert_eq!(ids, ["listUsers", "getUser", "createUser", "deleteUser"]);
    }

    #[actix_web::test]
    async fn test_create_then_get() {
        let service = UsersService::new(RoutesConfig::default()).unwrap();
        let app = test::init_service(App::new().configure(|cfg| service.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "Ada"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: User = test::read_body_json(resp).await;
        assert_eq!(created.name, "Ada");

        let req = test::TestRequest::get()
            .uri(&format!("/users/{}", created.user_id))
            .to_request();
        let fetched: User = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        let req = test::TestRequest::get().uri("/users/404").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_unknown_field_rejected() {
        let service = UsersService::new(RoutesConfig::default()).unwrap();
        let app = test::init_service(App::new().configure(|cfg| service.configure(cfg))).await;
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "Ada", "admin": true}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(service.store().list(None).is_empty());
    }

    #[::core::prelude::v1::test]
    fn test_create_body_follows_new_user() {
        let api = users_api().unwrap();
        let body = api.endpoint("createUser").unwrap().request_body().unwrap().definition();
        assert_eq!(body["additionalProperties"], json!(false));
        assert_eq!(body["required"], json!(["name"]));
        assert!(body["properties"]["email"].is_object());
    }

    #[actix_web::test]
    async fn test_delete_requires_api_key() {
        let service = UsersService::new(RoutesConfig::default()).unwrap();
        service.store().insert(NewUser {
            name: "Ada".into(),
            email: None,
        });
        let app = test::init_service(App::new().configure(|cfg| service.configure(cfg))).await;

        let req = test::TestRequest::delete().uri("/users/0").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri("/users/0")
            .insert_header(("X-Api-Key", "secret"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(service.store().get("0").is_none());
    }

    #[actix_web::test]
    async fn test_openapi_document_served() {
        let service = UsersService::new(RoutesConfig::default()).unwrap();
        let app = test::init_service(App::new().configure(|cfg| service.configure(cfg))).await;
        let req = test::TestRequest::get().uri("/openapi.json").to_request();
        let doc: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["paths"]["/users/{userId}"]["delete"]["operationId"], "deleteUser");
        assert_eq!(
            doc["paths"]["/users"]["get"]["parameters"][0],
            json!({"name": "name", "in": "query", "required": false, "schema": {"type": "string"}})
        );
    }
}
