//! Evaluation context
//!
//! The mutable scratch space threaded through every `eval` call: the game
//! being played, the current assignment, an optional hint vector and an
//! optional region override.
//!
//! A context belongs to exactly one in-progress evaluation. Nodes never
//! assign the hint or region fields directly; they install an override with
//! [`EvalContext::scope_hint`] or [`EvalContext::scope_region`], which
//! returns a [`ScopedContext`] guard. Dropping the guard restores the
//! previous value, so the override is undone on every exit path of the
//! enclosing call, including `?` propagation and early `false` returns.
//!
//! ```
//! # use ludeme_core::context::EvalContext;
//! # use ludeme_core::game::{Board, Game};
//! # use ludeme_core::storage::StateStore;
//! let game = Game::puzzle("p", Board::square(2));
//! let state = StateStore::new(&game.board);
//! let mut ctx = EvalContext::new(&game, &state);
//! {
//!     let scoped = ctx.scope_hint(Some(vec![4]));
//!     assert_eq!(scoped.hint(), Some(&[4][..]));
//! }
//! assert_eq!(ctx.hint(), None);
//! ```

use std::ops::{Deref, DerefMut};

use crate::error::{Error, Result};
use crate::game::Game;
use crate::region::Region;
use crate::storage::StateStore;

/// Context available to node evaluation.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    game: &'a Game,
    state: &'a StateStore,
    hint: Option<Vec<i32>>,
    region: Option<Region>,
}

impl<'a> EvalContext<'a> {
    pub fn new(game: &'a Game, state: &'a StateStore) -> Self {
        Self {
            game,
            state,
            hint: None,
            region: None,
        }
    }

    /// Start with a caller-supplied hint vector.
    pub fn with_hint(mut self, hint: Vec<i32>) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Start with a caller-supplied region override.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn game(&self) -> &'a Game {
        self.game
    }

    pub fn state(&self) -> &'a StateStore {
        self.state
    }

    pub fn hint(&self) -> Option<&[i32]> {
        self.hint.as_deref()
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Hint value at `position`.
    pub fn hint_value(&self, position: usize) -> Result<i32> {
        let hint = self.hint.as_deref().unwrap_or_default();
        hint.get(position).copied().ok_or(Error::MissingHint {
            position,
            len: hint.len(),
        })
    }

    /// Replace the hint vector until the returned guard is dropped.
    pub fn scope_hint(&mut self, hint: Option<Vec<i32>>) -> ScopedContext<'_, 'a> {
        let saved = std::mem::replace(&mut self.hint, hint);
        ScopedContext {
            ctx: self,
            saved_hint: Some(saved),
            saved_region: None,
        }
    }

    /// Replace the region override until the returned guard is dropped.
    pub fn scope_region(&mut self, region: Option<Region>) -> ScopedContext<'_, 'a> {
        let saved = std::mem::replace(&mut self.region, region);
        ScopedContext {
            ctx: self,
            saved_hint: None,
            saved_region: Some(saved),
        }
    }
}

/// Guard holding a transient override of an [`EvalContext`].
///
/// Dereferences to the overridden context; restores the saved field on drop.
pub struct ScopedContext<'s, 'a> {
    ctx: &'s mut EvalContext<'a>,
    saved_hint: Option<Option<Vec<i32>>>,
    saved_region: Option<Option<Region>>,
}

impl<'a> Deref for ScopedContext<'_, 'a> {
    type Target = EvalContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'a> DerefMut for ScopedContext<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ScopedContext<'_, '_> {
    fn drop(&mut self) {
        if let Some(hint) = self.saved_hint.take() {
            self.ctx.hint = hint;
        }
        if let Some(region) = self.saved_region.take() {
            self.ctx.region = region;
        }
    }
}
