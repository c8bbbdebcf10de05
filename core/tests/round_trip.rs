use actix_web::http::StatusCode;
use actix_web::{test, App, HttpResponse};
use apidriven_core::client::RequestDescriptor;
use apidriven_core::{
    get, post, ApiClient, ApiDocs, ApiModel, ApiResponse, ApiRoutes, AppResult, CallConfig,
    EndpointCall, Schema, Transport,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct NoopTransport;

impl Transport for NoopTransport {
    fn send(&self, _request: RequestDescriptor) -> AppResult<ApiResponse> {
        Ok(ApiResponse::default())
    }
}

fn users_api() -> Arc<ApiModel> {
    Arc::new(
        ApiModel::builder(ApiDocs::new("Users", "1.0.0"))
            .endpoint(
                "getUser",
                get("/users/:userId")
                    .status(200)
                    .header("X-Tenant", Schema::string())
                    .response_body(Schema::object([
                        ("userId", Schema::string()),
                        ("tenant", Schema::string()),
                    ]))
                    .build()
                    .unwrap(),
            )
            .endpoint(
                "searchUsers",
                get("/users")
                    .status(200)
                    .query("name", Schema::string())
                    .response_body(Schema::array(Schema::string()))
                    .build()
                    .unwrap(),
            )
            .endpoint(
                "createUser",
                post("/users")
                    .status(201)
                    .request_body(Schema::strict_object([("userId", Schema::string())]))
                    .response_body(Schema::object([("userId", Schema::string())]))
                    .build()
                    .unwrap(),
            )
            .endpoint(
                "getFile",
                get("/files/:name").status(200).build().unwrap(),
            )
            .build()
            .unwrap(),
    )
}

async fn get_user(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    Ok(call.respond(json!({
        "userId": call.params["userId"],
        "tenant": call.params["X-Tenant"],
    }))?)
}

async fn search_users(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    Ok(call.respond(json!([call.params["name"]]))?)
}

async fn create_user(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    Ok(call.respond(call.request_body.clone())?)
}

async fn get_file(call: EndpointCall) -> Result<HttpResponse, actix_web::Error> {
    Ok(HttpResponse::Ok().json(&call.params))
}

fn routes(api: Arc<ApiModel>) -> ApiRoutes {
    let mut routes = ApiRoutes::new(api);
    routes.register("getUser", get_user).unwrap();
    routes.register("searchUsers", search_users).unwrap();
    routes.register("createUser", create_user).unwrap();
    routes.register("getFile", get_file).unwrap();
    routes
}

fn to_test_request(request: RequestDescriptor) -> test::TestRequest {
    let mut builder = test::TestRequest::default()
        .method(request.method.into())
        .uri(&request.url);
    for (name, value) in request.headers {
        builder = builder.insert_header((name, value));
    }
    if let Some(body) = request.body {
        builder = builder.set_json(body);
    }
    builder
}

#[actix_web::test]
async fn test_client_requests_satisfy_server_contracts() {
    let api = users_api();
    let client = ApiClient::new(api.clone(), NoopTransport);
    let routes = routes(api);
    let app = test::init_service(App::new().configure(|cfg| routes.configure(cfg))).await;

    let request = client
        .request(
            "getUser",
            CallConfig::new().param("userId", "a b").param("X-Tenant", "acme"),
        )
        .unwrap();
    assert_eq!(request.url, "/users/a%20b");
    let body: Value = test::call_and_read_body_json(&app, to_test_request(request).to_request()).await;
    assert_eq!(body, json!({"userId": "a b", "tenant": "acme"}));

    let request = client
        .request("searchUsers", CallConfig::new().param("name", "Ada Lovelace"))
        .unwrap();
    let body: Value = test::call_and_read_body_json(&app, to_test_request(request).to_request()).await;
    assert_eq!(body, json!(["Ada Lovelace"]));

    let request = client
        .request("createUser", CallConfig::new().body(json!({"userId": "0"})))
        .unwrap();
    let resp = test::call_service(&app, to_test_request(request).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"userId": "0"}));
}

#[actix_web::test]
async fn test_missing_client_values_are_rejected_by_server() {
    let api = users_api();
    let client = ApiClient::new(api.clone(), NoopTransport);
    let routes = routes(api);
    let app = test::init_service(App::new().configure(|cfg| routes.configure(cfg))).await;

    let request = client
        .request("getUser", CallConfig::new().param("userId", "0"))
        .unwrap();
    let resp = test::call_service(&app, to_test_request(request).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid headers");
}

#[actix_web::test]
async fn test_reserved_characters_survive_path_round_trip() {
    let api = users_api();
    let client = ApiClient::new(api.clone(), NoopTransport);
    let routes = routes(api);
    let app = test::init_service(App::new().configure(|cfg| routes.configure(cfg))).await;

    for name in ["a/b", "100%", "a+b", "x%2Fy"] {
        let request = client
            .request("getFile", CallConfig::new().param("name", name))
            .unwrap();
        let body: Value = test::call_and_read_body_json(&app, to_test_request(request).to_request()).await;
        assert_eq!(body, json!({ "name": name }));
    }
}
