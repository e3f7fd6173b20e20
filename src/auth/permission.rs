use std::fmt;

/// Capability strings an endpoint can require from the `permissions` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ReadDrinkDetail,
    CreateDrinks,
    UpdateDrinks,
    DeleteDrinks,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadDrinkDetail => "get:drinks-detail",
            Permission::CreateDrinks => "post:drinks",
            Permission::UpdateDrinks => "patch:drinks",
            Permission::DeleteDrinks => "delete:drinks",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
