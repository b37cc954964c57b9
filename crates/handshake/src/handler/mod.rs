//! Message handlers invoked by [`PipelineConnection`](crate::connection::PipelineConnection).

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::Message;

#[async_trait]
pub trait MessageHandler {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, message: Message) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> MessageHandler for HandlerFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<(), Err>> + Send,
{
    type Error = Err;

    async fn call(&self, message: Message) -> Result<(), Self::Error> {
        (self.f)(message).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<(), Err>>,
    F: Fn(Message) -> Ret,
{
    HandlerFn { f }
}
