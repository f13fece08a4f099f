//! Stream requests through `StreamSender::create_stream`.

use futures::{StreamExt, TryStreamExt, stream};
use herald::{
    BoxError, CancellationToken, ErasedItem, ItemStream, MediatorConfig, OpenStreamBehavior,
    OpenStreamNext, Registry, RequestInfo, StreamNext, StreamPipelineBehavior, StreamRequest,
    StreamRequestHandler, StreamSender,
};
use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

mod common;
use common::mediator;

#[derive(Debug)]
struct CountTo(u32);

impl StreamRequest for CountTo {
    type Item = u32;
}

struct Counter;

impl StreamRequestHandler<CountTo> for Counter {
    fn handle(&self, request: Arc<CountTo>, _cancel: CancellationToken) -> ItemStream<u32> {
        stream::iter(1..=request.0).map(Ok).boxed()
    }
}

struct Doubler;

impl StreamPipelineBehavior<CountTo> for Doubler {
    fn handle(
        &self,
        _request: Arc<CountTo>,
        next: StreamNext<CountTo>,
        _cancel: CancellationToken,
    ) -> ItemStream<u32> {
        next.run().map_ok(|item| item * 2).boxed()
    }
}

#[derive(Clone, Default)]
struct ItemCounter {
    seen: Arc<AtomicUsize>,
}

impl OpenStreamBehavior for ItemCounter {
    fn handle(
        &self,
        _info: RequestInfo,
        _request: Arc<dyn Any + Send + Sync>,
        next: OpenStreamNext,
        _cancel: CancellationToken,
    ) -> ItemStream<ErasedItem> {
        let seen = Arc::clone(&self.seen);
        next.run()
            .inspect_ok(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }
}

#[tokio::test]
async fn test_stream_yields_handler_items() {
    let mediator = mediator(Registry::builder().stream_handler::<CountTo, _>(Counter));

    let items: Vec<u32> = mediator
        .create_stream(CountTo(3), &CancellationToken::new())
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(items, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_stream_behaviors_wrap_the_handler_stream() {
    let counter = ItemCounter::default();
    let mediator = MediatorConfig::builder()
        .with_stream_behavior(counter.clone())
        .build()
        .build(
            Registry::builder()
                .stream_handler::<CountTo, _>(Counter)
                .stream_behavior::<CountTo, _>(Doubler),
        );

    let items: Vec<u32> = mediator
        .create_stream(CountTo(3), &CancellationToken::new())
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(items, vec![2, 4, 6]);
    assert_eq!(counter.seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_missing_stream_handler_is_misconfiguration() {
    let mediator = mediator(Registry::builder());

    let err = mediator
        .create_stream(CountTo(3), &CancellationToken::new())
        .err()
        .unwrap();

    assert!(err.is_handler_not_found());
}

#[tokio::test]
async fn test_cancellation_ends_the_stream() {
    struct Endless;

    impl StreamRequestHandler<CountTo> for Endless {
        fn handle(&self, _request: Arc<CountTo>, _cancel: CancellationToken) -> ItemStream<u32> {
            stream::unfold(0_u32, |n| async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Some((Ok::<_, BoxError>(n), n + 1))
            })
            .boxed()
        }
    }

    let mediator = mediator(Registry::builder().stream_handler::<CountTo, _>(Endless));
    let cancel = CancellationToken::new();
    let mut items = mediator.create_stream(CountTo(0), &cancel).unwrap();

    assert_eq!(items.next().await.unwrap().unwrap(), 0);
    assert_eq!(items.next().await.unwrap().unwrap(), 1);
    cancel.cancel();
    assert!(items.next().await.is_none());
}

#[tokio::test]
async fn test_item_errors_surface_as_domain_errors() {
    struct Broken;

    impl StreamRequestHandler<CountTo> for Broken {
        fn handle(&self, _request: Arc<CountTo>, _cancel: CancellationToken) -> ItemStream<u32> {
            stream::iter(vec![Ok(1), Err(BoxError::from("broken pipe"))]).boxed()
        }
    }

    let mediator = mediator(Registry::builder().stream_handler::<CountTo, _>(Broken));
    let results: Vec<_> = mediator
        .create_stream(CountTo(0), &CancellationToken::new())
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(*results[0].as_ref().unwrap(), 1);
    let err = results[1].as_ref().unwrap_err();
    assert!(!err.is_misconfigured());
    assert_eq!(err.to_string(), "broken pipe");
}
