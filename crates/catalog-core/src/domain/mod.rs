//! 카탈로그 서비스의 도메인 모델.

mod product;
mod role;
mod user;

pub use product::*;
pub use role::*;
pub use user::*;
