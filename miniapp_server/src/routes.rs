//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module
//! neat and tidy 🙏
//!
//! Handlers are async and must never block the worker thread; the only I/O any of them performs
//! is the single storage round trip behind [`AuthApi`].

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use miniapp_engine::{
    helpers::{parse_legacy_test_params, InitData},
    traits::UserManagement,
    AuthApi,
};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::InitDataPolicy,
    data_objects::{AuthRequest, AuthResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!`
// macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
            impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(auth => Post "/auth/telegram" impl UserManagement);
/// Route handler for Mini App sign-in.
///
/// Exchanges signed Telegram launch data for an access token. The attempt walks
/// `Received -> Parsed -> Verified -> Resolved -> Issued` and short-circuits with the first
/// failure:
/// * unparseable payload, missing `user` field, bad user id: 400;
/// * missing or mismatching signature: 401 (constant body);
/// * lost first-sign-in race that cannot be resolved by a re-read: 409, safe to retry once;
/// * storage trouble: 5xx, safe to retry with backoff.
///
/// On success the response carries the bearer token (valid for 24 hours, no refresh) and the
/// resolved user record.
pub async fn auth<B>(
    body: web::Json<AuthRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
    policy: web::Data<InitDataPolicy>,
) -> Result<HttpResponse, ServerError>
where
    B: UserManagement,
{
    trace!("💻️ Received auth request");
    let init_data = InitData::parse(&body.init_data)?;
    match policy.get_ref() {
        InitDataPolicy::Enforced(bot_token) => init_data.verify(bot_token.reveal())?,
        InitDataPolicy::DisabledForTesting => {
            warn!("🔐️ Launch data checks are disabled. Skipping signature verification.")
        },
    }
    let user = api.get_or_create_user(init_data.user()).await?;
    let token = signer.issue_token(&user)?;
    debug!("💻️ Issued access token for user {}", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

route!(auth_test => Post "/auth/telegram/test" impl UserManagement);
/// Legacy flat-parameter sign-in shim (`user_id=...&username=...`, no signature).
///
/// Only mounted when the server runs with [`InitDataPolicy::DisabledForTesting`]; a verifying
/// deployment never exposes this route.
pub async fn auth_test<B>(
    body: web::Json<AuthRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    B: UserManagement,
{
    warn!("💻️ Received UNSIGNED test auth request");
    let claim = parse_legacy_test_params(&body.init_data)?;
    let user = api.get_or_create_user(&claim).await?;
    let token = signer.issue_token(&user)?;
    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(profile => Get "/profile" impl UserManagement);
/// Returns the account record of the authenticated caller.
pub async fn profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET profile for user {}", claims.user_id);
    let user = api
        .fetch_user(claims.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("user account {}", claims.user_id)))?;
    Ok(HttpResponse::Ok().json(user))
}

//----------------------------------------------   Check token  ----------------------------------------------------
route!(check_token => Get "/check_token");
/// Echoes the validated claims back to the caller. Handy for clients that want to confirm a
/// stored token is still good without triggering any storage work.
pub async fn check_token(claims: JwtClaims) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Token check for user {}", claims.user_id);
    Ok(HttpResponse::Ok().json(claims))
}
