pub mod cipher_service;
pub mod jwt_service;
