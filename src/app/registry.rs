//! 组件生命周期注册表
//!
//! 组件注册后归注册表所有，由宿主按注册顺序驱动 setup / poll / teardown。

use crate::config::ComponentId;

use super::host::HostError;

/// 宿主驱动的组件生命周期
pub trait Component {
    /// 启动时调用一次
    fn setup(&mut self) {}

    /// 主循环中反复调用
    fn poll(&mut self) {}

    /// 关闭前调用一次
    fn teardown(&mut self) {}
}

pub struct ComponentRegistry<C> {
    entries: Vec<(ComponentId, C)>,
}

impl<C> Default for ComponentRegistry<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> ComponentRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件，标识重复时返回错误
    pub fn register(&mut self, id: ComponentId, component: C) -> Result<(), HostError> {
        if self.contains(&id) {
            return Err(HostError::DuplicateComponent(id.to_string()));
        }
        log::info!("注册组件 `{id}`");
        self.entries.push((id, component));
        Ok(())
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.entries.iter().any(|(entry, _)| entry == id)
    }

    pub fn get(&self, id: &ComponentId) -> Option<&C> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == id)
            .map(|(_, component)| component)
    }

    pub fn get_mut(&mut self, id: &ComponentId) -> Option<&mut C> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| entry == id)
            .map(|(_, component)| component)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按注册顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &C)> {
        self.entries.iter().map(|(id, component)| (id, component))
    }
}

impl<C: Component> ComponentRegistry<C> {
    pub fn setup_all(&mut self) {
        for (_, component) in &mut self.entries {
            component.setup();
        }
    }

    pub fn poll_all(&mut self) {
        for (_, component) in &mut self.entries {
            component.poll();
        }
    }

    pub fn teardown_all(&mut self) {
        for (_, component) in &mut self.entries {
            component.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        setups: u32,
        polls: u32,
        teardowns: u32,
    }

    impl Component for Counter {
        fn setup(&mut self) {
            self.setups += 1;
        }

        fn poll(&mut self) {
            self.polls += 1;
        }

        fn teardown(&mut self) {
            self.teardowns += 1;
        }
    }

    fn id(text: &str) -> ComponentId {
        ComponentId::parse(text).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register(id("a"), Counter::default()).unwrap();
        registry.register(id("b"), Counter::default()).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&id("a")).is_some());
        assert!(registry.get(&id("c")).is_none());

        let order: Vec<_> = registry.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ComponentRegistry::new();
        registry.register(id("a"), Counter::default()).unwrap();

        assert!(matches!(
            registry.register(id("a"), Counter::default()),
            Err(HostError::DuplicateComponent(name)) if name == "a"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lifecycle_hooks() {
        let mut registry = ComponentRegistry::new();
        registry.register(id("a"), Counter::default()).unwrap();

        registry.setup_all();
        registry.poll_all();
        registry.poll_all();
        registry.teardown_all();

        let counter = registry.get(&id("a")).unwrap();
        assert_eq!(counter.setups, 1);
        assert_eq!(counter.polls, 2);
        assert_eq!(counter.teardowns, 1);
    }
}
