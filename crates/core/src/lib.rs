#![forbid(unsafe_code)]

pub mod history;

pub mod ids {
    use uuid::Uuid;

    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    )]
    #[serde(transparent)]
    pub struct TreeId(Uuid);

    impl TreeId {
        pub fn new() -> Self {
            Self(Uuid::new_v4())
        }

        pub fn from_uuid(value: Uuid) -> Self {
            Self(value)
        }

        pub fn parse(value: &str) -> Result<Self, IdError> {
            match Uuid::try_parse(value) {
                Ok(parsed) => Ok(Self(parsed)),
                Err(_) => Err(IdError::Malformed {
                    input: value.to_string(),
                }),
            }
        }

        pub fn as_uuid(&self) -> Uuid {
            self.0
        }
    }

    impl Default for TreeId {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Display for TreeId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.hyphenated())
        }
    }

    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    )]
    #[serde(transparent)]
    pub struct BranchId(Uuid);

    impl BranchId {
        pub fn new() -> Self {
            Self(Uuid::new_v4())
        }

        pub fn from_uuid(value: Uuid) -> Self {
            Self(value)
        }

        pub fn parse(value: &str) -> Result<Self, IdError> {
            match Uuid::try_parse(value) {
                Ok(parsed) => Ok(Self(parsed)),
                Err(_) => Err(IdError::Malformed {
                    input: value.to_string(),
                }),
            }
        }

        pub fn as_uuid(&self) -> Uuid {
            self.0
        }
    }

    impl Default for BranchId {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Display for BranchId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.hyphenated())
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum IdError {
        Malformed { input: String },
    }

    impl std::fmt::Display for IdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Malformed { input } => write!(f, "malformed id: {input}"),
            }
        }
    }

    impl std::error::Error for IdError {}
}
