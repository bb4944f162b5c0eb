mod mocks;

mod cart;
mod catalog;
mod orders;
mod webhook;
