mod request;

pub use request::HTTP_CLIENT;
