/*!
 * Root Set
 * Caller-registered entry points for the mark phase
 */

use crate::core::types::Address;

/// Ordered root addresses
///
/// Registration never deduplicates. A root that no longer points at a live
/// allocation is harmless: the mark phase skips it, or keeps alive whatever
/// now occupies that block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet {
    roots: Vec<Address>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, address: Address) {
        self.roots.push(address);
    }

    /// Remove the first occurrence of `address`
    pub fn unregister(&mut self, address: Address) -> bool {
        match self.roots.iter().position(|&root| root == address) {
            Some(index) => {
                self.roots.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        self.roots.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.roots.iter().copied()
    }

    /// Copy used as the initial mark stack
    pub fn snapshot(&self) -> Vec<Address> {
        self.roots.clone()
    }
}
