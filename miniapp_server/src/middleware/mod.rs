mod bearer;

pub use bearer::JwtMiddlewareFactory;
