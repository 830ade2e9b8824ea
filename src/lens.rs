//! Bidirectional accessors between a whole value and one of its parts.

use std::fmt;
use std::sync::Arc;

type Getter<W, P> = Arc<dyn Fn(&W) -> P + Send + Sync>;
type Setter<W, P> = Arc<dyn Fn(W, P) -> W + Send + Sync>;

/// A `get`/`set` pair focusing on a part `P` of a whole `W`.
///
/// Both functions must be pure and obey the lens laws:
///
/// ```text
/// get(set(w, p))          == p
/// set(w, get(w))          == w
/// set(set(w, p1), p2)     == set(w, p2)
/// ```
///
/// These laws are not checked at runtime.
pub struct Lens<W, P> {
    get: Getter<W, P>,
    set: Setter<W, P>,
}

impl<W, P> Lens<W, P> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&W) -> P + Send + Sync + 'static,
        S: Fn(W, P) -> W + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Read the focused part.
    pub fn get(&self, whole: &W) -> P {
        (self.get)(whole)
    }

    /// Replace the focused part, returning the new whole.
    pub fn set(&self, whole: W, part: P) -> W {
        (self.set)(whole, part)
    }

    /// Apply `f` to the focused part.
    pub fn modify<F>(&self, whole: W, f: F) -> W
    where
        F: FnOnce(P) -> P,
    {
        let part = f(self.get(&whole));
        self.set(whole, part)
    }
}

impl<W: 'static, P: 'static> Lens<W, P> {
    /// Focus further into the part with `inner`.
    ///
    /// Setting through the composed lens reads the intermediate part from the
    /// whole being updated, so the result obeys the laws whenever both halves do.
    pub fn then<Q: 'static>(&self, inner: Lens<P, Q>) -> Lens<W, Q> {
        let outer_get = Arc::clone(&self.get);
        let outer = self.clone();
        let inner_get = Arc::clone(&inner.get);

        Lens::new(
            move |whole: &W| inner_get(&outer_get(whole)),
            move |whole: W, part: Q| {
                let middle = inner.set(outer.get(&whole), part);
                outer.set(whole, middle)
            },
        )
    }
}

impl<W, P> Clone for Lens<W, P> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<W, P> fmt::Debug for Lens<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("whole", &std::any::type_name::<W>())
            .field("part", &std::any::type_name::<P>())
            .finish()
    }
}

/// Build a [`Lens`] over a named struct field.
///
/// ```
/// use rxreduce::field_lens;
///
/// #[derive(Clone)]
/// struct Counter { value: i64 }
///
/// let lens = field_lens!(Counter, value);
/// let next = lens.set(Counter { value: 1 }, 5);
/// assert_eq!(lens.get(&next), 5);
/// ```
#[macro_export]
macro_rules! field_lens {
    ($whole:ty, $field:ident) => {
        $crate::Lens::new(
            |whole: &$whole| whole.$field.clone(),
            |mut whole: $whole, part| {
                whole.$field = part;
                whole
            },
        )
    };
}
