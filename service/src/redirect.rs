//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Output redirection controller
//!
//! An [`OutputHandle`] owns the current [`OutputSink`] of a shell session and
//! switches it between the network and redirected destinations. Nested
//! redirections are undone with the [`RedirectionSnapshot`] returned when they
//! were set up, strictly last-in first-out.

use crate::output::{Destination, OutputSink, Redirection};
use std::io;
use std::mem;
use tracing::debug;

/// Saved sink state from [`OutputHandle::redirect_saving`].
///
/// Moves the whole previous sink, including any stream it had open, so the
/// paired [`OutputHandle::undirect`] restores it exactly.
#[must_use = "a redirection snapshot must be passed back to undirect"]
#[derive(Debug)]
pub struct RedirectionSnapshot {
    saved: OutputSink,
    depth: usize,
}

impl RedirectionSnapshot {
    /// Whether the saved sink was redirected
    pub fn is_redirected(&self) -> bool {
        self.saved.is_redirected()
    }

    /// Redirect target of the saved sink
    pub fn destination(&self) -> Option<&Destination> {
        self.saved.destination()
    }

    /// Nesting depth this snapshot restores from
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Reference-counted owner of a session's output sink
#[derive(Debug)]
pub struct OutputHandle {
    sink: OutputSink,
    refs: usize,
    depth: usize,
}

impl OutputHandle {
    /// A handle writing to the network, as used by a fresh connection
    pub fn network() -> Self {
        Self::with_sink(OutputSink::NetworkBacked)
    }

    /// A handle already redirected to `destination`
    pub fn redirected(destination: Destination) -> Self {
        Self::with_sink(OutputSink::RedirectBacked(Redirection::new(destination)))
    }

    fn with_sink(sink: OutputSink) -> Self {
        Self {
            sink,
            refs: 1,
            depth: 0,
        }
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut OutputSink {
        &mut self.sink
    }

    pub fn is_redirected(&self) -> bool {
        self.sink.is_redirected()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.sink.destination()
    }

    pub fn ref_count(&self) -> usize {
        self.refs
    }

    /// Number of saved redirections not yet undone
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Send output to `destination` without saving the current sink.
    ///
    /// A redirection already in place is flushed and closed first.
    pub async fn redirect(&mut self, destination: Destination) -> io::Result<()> {
        debug!(?destination, "Redirecting output");
        let previous = mem::replace(
            &mut self.sink,
            OutputSink::RedirectBacked(Redirection::new(destination)),
        );
        match previous {
            OutputSink::RedirectBacked(redirection) => redirection.close().await,
            OutputSink::NetworkBacked => Ok(()),
        }
    }

    /// Send output to `destination`, returning a snapshot of the current sink
    /// for [`OutputHandle::undirect`].
    ///
    /// A redirection already in place is flushed but stays open inside the
    /// snapshot.
    pub async fn redirect_saving(
        &mut self,
        destination: Destination,
    ) -> io::Result<RedirectionSnapshot> {
        if let OutputSink::RedirectBacked(redirection) = &mut self.sink {
            redirection.flush().await?;
        }
        debug!(?destination, depth = self.depth + 1, "Redirecting output");
        let saved = mem::replace(
            &mut self.sink,
            OutputSink::RedirectBacked(Redirection::new(destination)),
        );
        self.depth += 1;
        Ok(RedirectionSnapshot {
            saved,
            depth: self.depth,
        })
    }

    /// Close the current redirection and restore the sink saved in `snapshot`.
    ///
    /// Snapshots must be returned in the reverse order they were taken.
    pub async fn undirect(&mut self, snapshot: RedirectionSnapshot) -> io::Result<()> {
        debug_assert_eq!(
            snapshot.depth, self.depth,
            "redirections must be undone in reverse order"
        );
        self.depth = snapshot.depth - 1;
        debug!(depth = self.depth, "Restoring output");
        let current = mem::replace(&mut self.sink, snapshot.saved);
        match current {
            OutputSink::RedirectBacked(redirection) => redirection.close().await,
            OutputSink::NetworkBacked => Ok(()),
        }
    }

    /// A new handle with one reference and the same target, opened afresh.
    ///
    /// Cloning a network-backed handle targets the console, since the
    /// network belongs to the connection that owns it.
    pub fn clone_handle(&self) -> Self {
        let destination = self
            .sink
            .destination()
            .cloned()
            .unwrap_or(Destination::Console);
        Self::redirected(destination)
    }

    pub fn add_ref(&mut self) {
        self.refs += 1;
    }

    /// Drop one reference. Returns the handle while references remain, or
    /// tears it down and returns `None` when this was the last.
    ///
    /// # Panics
    ///
    /// The last reference may only be released while redirected; the network
    /// sink is owned by its connection and is torn down there.
    pub async fn release(mut self) -> io::Result<Option<Self>> {
        if self.refs > 1 {
            self.refs -= 1;
            return Ok(Some(self));
        }
        assert!(
            self.is_redirected(),
            "last reference to a network-backed output handle released"
        );
        debug_assert_eq!(self.depth, 0, "output handle released while redirected");
        self.close().await?;
        Ok(None)
    }

    /// Close any redirection and fall back to the network sink
    pub(crate) async fn close(&mut self) -> io::Result<()> {
        match mem::replace(&mut self.sink, OutputSink::NetworkBacked) {
            OutputSink::RedirectBacked(redirection) => redirection.close().await,
            OutputSink::NetworkBacked => Ok(()),
        }
    }
}
