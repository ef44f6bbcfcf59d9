macro_rules! impl_id {
    ($name:ident, $tp:ty) => {
        /// The ID type $name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub(crate) struct $name($tp);

        impl $name {
            /// Create a new id.
            #[inline]
            pub(crate) const fn new(index: $tp) -> Self {
                $name(index)
            }

            /// Get the id as usize.
            #[inline]
            pub(crate) fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Get the raw id.
            #[allow(dead_code)]
            #[inline]
            pub(crate) fn id(&self) -> $tp {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$tp> for $name {
            fn from(index: $tp) -> Self {
                $name::new(index)
            }
        }
    };
}

/// The ID type for automaton states, i.e. rows of the table set.
pub(crate) type StateIDBase = u32;
impl_id!(StateID, StateIDBase);

impl StateID {
    /// Decodes a raw table entry where `-1` (or any negative value) is the dead state.
    #[inline]
    pub(crate) fn from_raw(raw: i32) -> Option<StateID> {
        u32::try_from(raw).ok().map(StateID::new)
    }
}

/// The ID type for equivalence classes. The class of a byte is `class_of[byte]`.
pub(crate) type ClassIDBase = u32;
impl_id!(ClassID, ClassIDBase);

/// The ID type for rules. Rule 0 is reserved for "not accepting", lower ids have higher priority.
pub(crate) type RuleIDBase = u32;
impl_id!(RuleID, RuleIDBase);

impl RuleID {
    /// Returns true if the id denotes an actual rule.
    #[inline]
    pub(crate) fn is_rule(&self) -> bool {
        self.0 != 0
    }
}
