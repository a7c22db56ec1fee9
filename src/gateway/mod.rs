pub mod client;

pub use client::{
    CreateTransactionRequest, CreateTransactionResponse, Customer, GatewayClient, GatewayError,
    LineItem,
};
