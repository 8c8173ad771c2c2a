/// Ordered set of binders applied to every new target
///
/// Components that need to attach behavior to targets created
/// elsewhere register a binder once; whoever creates a target calls
/// `apply` on it. The registry is an ordinary value owned by whoever
/// needs it, so there is no process-wide list.
pub struct BindRegistry<T: ?Sized> {
    binders: Vec<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<T: ?Sized> BindRegistry<T> {
    pub fn new() -> Self {
        Self {
            binders: Vec::new(),
        }
    }

    /// Add a binder; binders run in registration order
    pub fn register<F>(&mut self, binder: F) -> &mut Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.binders.push(Box::new(binder));
        self
    }

    /// Run every binder against `target`
    pub fn apply(&self, target: &T) {
        for binder in &self.binders {
            binder(target);
        }
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

impl<T: ?Sized> Default for BindRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for BindRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindRegistry")
            .field("binders", &self.binders.len())
            .finish()
    }
}
