mod handler_error;
mod processor;
mod resolver;
mod response;
mod validation;
