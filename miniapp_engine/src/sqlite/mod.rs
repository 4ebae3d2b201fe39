mod db;
mod users;

pub use db::SqliteDatabase;
