use crate::{
    AsyncReplayError, PushedItemMessage, StoreClient, StoreMessage, StoreServerConfig,
    TransitionProxy,
};
use anyhow::Result;
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use log::{debug, info, warn};
use marl_replay_core::{Transition, TransitionStore};
use std::thread::JoinHandle;

/// Serves a [`TransitionStore`] confined to a dedicated thread.
///
/// Producers push transitions through [`TransitionProxy`]s and learners
/// sample through [`StoreClient`]s. The store itself is only touched by the
/// server thread, so no lock is involved.
///
/// Pushed transitions with a wrong number of agents are dropped with a
/// warning, since the producer is not waiting for a reply.
pub struct StoreServer<O, A> {
    n_buffer: usize,

    /// Sender of transitions, cloned into proxies.
    item_sender: Sender<PushedItemMessage<Transition<O, A>>>,

    /// Sender of requests, cloned into clients.
    request_sender: Sender<StoreMessage<O, A>>,

    handle: JoinHandle<usize>,
}

impl<O, A> StoreServer<O, A>
where
    O: Clone + Send + 'static,
    A: Clone + Send + 'static,
{
    /// Builds the store and starts the server thread.
    ///
    /// # Errors
    ///
    /// Fails with [`ReplayError::InvalidConfiguration`](marl_replay_core::ReplayError)
    /// if the store configuration is invalid, and with
    /// [`AsyncReplayError::InvalidChannelCapacity`] if
    /// `config.channel_capacity` is zero.
    pub fn spawn(config: &StoreServerConfig) -> Result<Self> {
        if config.channel_capacity == 0 {
            return Err(AsyncReplayError::InvalidChannelCapacity.into());
        }
        let store = TransitionStore::<O, A>::from_config(&config.store)?;
        let (item_sender, item_receiver) = bounded(config.channel_capacity);
        let (request_sender, request_receiver) = unbounded();

        let handle = std::thread::spawn(move || {
            Self::run_loop(store, item_receiver, request_receiver)
        });
        info!("Started store server");

        Ok(Self {
            n_buffer: config.n_buffer,
            item_sender,
            request_sender,
            handle,
        })
    }

    /// Returns a new learner-side handle.
    pub fn client(&self) -> StoreClient<O, A> {
        StoreClient::new(self.request_sender.clone())
    }

    /// Returns a new producer-side handle with the given id.
    pub fn proxy(&self, id: usize) -> TransitionProxy<O, A> {
        TransitionProxy::new(id, self.n_buffer, self.item_sender.clone())
    }

    /// Asks the server thread to stop.
    ///
    /// Transitions sent before this call are stored before the thread exits.
    pub fn stop(&self) -> Result<()> {
        self.request_sender
            .send(StoreMessage::Stop)
            .map_err(|_| AsyncReplayError::Disconnected)?;
        Ok(())
    }

    /// Waits until the server thread finishes.
    ///
    /// Without a prior [`stop`](Self::stop), the thread finishes once every
    /// [`StoreClient`] and [`TransitionProxy`] handed out by this server has
    /// been dropped.
    ///
    /// Returns the number of transitions the server received.
    pub fn join(self) -> Result<usize> {
        let Self {
            item_sender,
            request_sender,
            handle,
            ..
        } = self;
        drop(item_sender);
        drop(request_sender);

        let n_received = handle
            .join()
            .map_err(|_| AsyncReplayError::ServerPanicked)?;
        Ok(n_received)
    }

    /// Stops and joins the server thread.
    pub fn stop_and_join(self) -> Result<usize> {
        self.stop()?;
        self.join()
    }

    fn run_loop(
        mut store: TransitionStore<O, A>,
        item_receiver: Receiver<PushedItemMessage<Transition<O, A>>>,
        request_receiver: Receiver<StoreMessage<O, A>>,
    ) -> usize {
        let mut n_received = 0;

        loop {
            select! {
                recv(item_receiver) -> msg => match msg {
                    Ok(msg) => n_received += Self::store_items(&mut store, msg),
                    Err(_) => {
                        debug!("All producers are gone");
                        Self::serve_requests(&mut store, &request_receiver);
                        break;
                    }
                },
                recv(request_receiver) -> msg => {
                    // Requests observe every transition pushed before them.
                    while let Ok(msg) = item_receiver.try_recv() {
                        n_received += Self::store_items(&mut store, msg);
                    }

                    match msg {
                        Ok(StoreMessage::Stop) | Err(_) => break,
                        Ok(msg) => Self::handle_request(&mut store, msg),
                    }
                },
            }
        }

        info!(
            "Stopped store server: received {} transitions, {} stored",
            n_received,
            store.size()
        );
        n_received
    }

    fn store_items(
        store: &mut TransitionStore<O, A>,
        msg: PushedItemMessage<Transition<O, A>>,
    ) -> usize {
        let n = msg.pushed_items.len();
        debug!("Received {} transitions from proxy {}", n, msg.id);

        for tr in msg.pushed_items {
            if let Err(e) = store.add_transition(tr) {
                warn!("Dropped a transition from proxy {}: {}", msg.id, e);
            }
        }
        n
    }

    fn serve_requests(
        store: &mut TransitionStore<O, A>,
        request_receiver: &Receiver<StoreMessage<O, A>>,
    ) {
        for msg in request_receiver.iter() {
            match msg {
                StoreMessage::Stop => break,
                msg => Self::handle_request(store, msg),
            }
        }
    }

    // Replies are dropped silently when the client has gone away.
    fn handle_request(store: &mut TransitionStore<O, A>, msg: StoreMessage<O, A>) {
        match msg {
            StoreMessage::Len(reply) => {
                let _ = reply.send(store.size());
            }
            StoreMessage::Sample(batch_size, reply) => {
                let _ = reply.send(store.sample(batch_size));
            }
            StoreMessage::Latest(batch_size, reply) => {
                let _ = reply.send(store.sample_latest(batch_size));
            }
            StoreMessage::EncodeBatch(ixs, reply) => {
                let _ = reply.send(store.encode_batch(&ixs));
            }
            StoreMessage::Stop => {}
        }
    }
}
