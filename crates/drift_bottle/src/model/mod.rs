pub mod bottle;
