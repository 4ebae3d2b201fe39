use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use miniapp_engine::{AuthApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::{health, AuthRoute, AuthTestRoute, CheckTokenRoute, ProfileRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let auth_api = AuthApi::new(db.clone());
        let signer = TokenIssuer::new(&config.auth);
        let policy = config.init_data.clone();
        let test_mode = !policy.is_enforced();
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mas::access_log"))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(signer.clone()))
            .app_data(web::Data::new(policy));
        // Routes that require a valid bearer token
        let api_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(signer))
            .service(ProfileRoute::<SqliteDatabase>::new())
            .service(CheckTokenRoute::new());
        let app = app.service(health).service(AuthRoute::<SqliteDatabase>::new()).service(api_scope);
        // The unsigned test endpoint only exists when verification is explicitly disabled.
        if test_mode {
            app.service(AuthTestRoute::<SqliteDatabase>::new())
        } else {
            app
        }
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
