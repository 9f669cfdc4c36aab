/// Called with the old and the new value whenever a variable changes
pub type VariableListener<T> = Box<dyn FnMut(&T, &T)>;

pub(crate) struct ValueCell<T> {
    value: T,
    listeners: Vec<VariableListener<T>>,
}

impl<T> ValueCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }

    pub(crate) fn replace(&mut self, value: T) {
        let old = std::mem::replace(&mut self.value, value);
        for listener in self.listeners.iter_mut() {
            listener(&old, &self.value);
        }
    }

    pub(crate) fn add_listener(&mut self, listener: VariableListener<T>) {
        self.listeners.push(listener);
    }
}
