//! Pre-handler events.
//!
//! Every event registered on the server runs once per exchange, before the
//! handler, in the order it was registered. An event may change the response
//! status and may cancel the exchange. Cancellation is sticky but does not
//! stop later events from running: the verdict is read once, after all of
//! them.
//!
//! ```rust
//! use missive::{Request, Response, Server, Status, Verdict};
//!
//! let builder = Server::builder(8080)
//!     .event(|req: &Request, _res: &mut Response| {
//!         if req.header("x-api-key").is_some() { Verdict::Proceed } else { Verdict::Cancel }
//!     })
//!     .event(|_req: &Request, res: &mut Response| {
//!         res.set_status(Status::CREATED);
//!         Verdict::Proceed
//!     });
//! ```

use crate::request::Request;
use crate::response::Response;

/// An event's decision about the exchange it just saw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Verdict {
    #[default]
    Proceed,
    Cancel,
}

/// A step run before every handler.
///
/// Events are shared by all in-flight exchanges; anything an event needs to
/// remember per exchange belongs in the returned [`Verdict`] or the
/// [`Response`], not in `self`.
pub trait Event: Send + Sync + 'static {
    fn handle(&self, req: &Request, res: &mut Response) -> Verdict;
}

impl<F> Event for F
where
    F: Fn(&Request, &mut Response) -> Verdict + Send + Sync + 'static,
{
    fn handle(&self, req: &Request, res: &mut Response) -> Verdict {
        self(req, res)
    }
}

/// The registered events, in registration order.
#[derive(Default)]
pub(crate) struct Pipeline {
    events: Vec<Box<dyn Event>>,
}

impl Pipeline {
    pub(crate) fn push(&mut self, event: Box<dyn Event>) {
        self.events.push(event);
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    /// Runs every event exactly once and reports whether any of them cancelled.
    pub(crate) fn run(&self, req: &Request, res: &mut Response) -> Verdict {
        let mut verdict = Verdict::Proceed;
        for event in &self.events {
            if event.handle(req, res) == Verdict::Cancel {
                verdict = Verdict::Cancel;
            }
        }
        verdict
    }
}
