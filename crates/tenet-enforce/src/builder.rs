use indexmap::IndexMap;

use tenet_core::descriptor::TypeDescriptor;
use tenet_core::signature::{CheckedLevel, Declaration, Mode, ReturnType};
use tenet_core::types::{ContractError, SourceLocation};

/// Receiver of a signature declaration block.
///
/// Methods chain like `s.params([("a", named("String"))]).returns(named("Symbol"))`.
/// The first misuse is remembered and reported when the declaration is
/// finished; later calls are ignored.
#[derive(Debug)]
pub struct DeclBuilder {
    decl: Declaration,
    error: Option<String>,
}

impl DeclBuilder {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            decl: Declaration::new(location),
            error: None,
        }
    }

    fn fail(&mut self, message: String) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(message);
        }
        self
    }

    pub fn params<K: Into<String>>(
        &mut self,
        params: impl IntoIterator<Item = (K, TypeDescriptor)>,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.decl.params.is_some() {
            return self.fail("You can't call .params twice".to_string());
        }
        let params: IndexMap<String, TypeDescriptor> =
            params.into_iter().map(|(k, t)| (k.into(), t)).collect();
        self.decl.params = Some(params);
        self
    }

    pub fn block_param(&mut self, name: impl Into<String>, ty: TypeDescriptor) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.decl.block_param.is_some() {
            return self.fail("You can't declare the block parameter twice".to_string());
        }
        self.decl.block_param = Some((name.into(), ty));
        self
    }

    pub fn returns(&mut self, ty: TypeDescriptor) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.decl.returns {
            Some(ReturnType::Void) => {
                self.fail("You can't call .returns after calling .void.".to_string())
            }
            Some(ReturnType::Type(_)) => {
                self.fail("You can't call .returns multiple times in a signature.".to_string())
            }
            None => {
                self.decl.returns = Some(ReturnType::Type(ty));
                self
            }
        }
    }

    pub fn void(&mut self) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.decl.returns {
            Some(ReturnType::Type(_)) => {
                self.fail("You can't call .void after calling .returns.".to_string())
            }
            Some(ReturnType::Void) => {
                self.fail("You can't call .void multiple times in a signature.".to_string())
            }
            None => {
                self.decl.returns = Some(ReturnType::Void);
                self
            }
        }
    }

    fn mode(&mut self, mode: Mode) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.decl.mode != Mode::Standard {
            let prev = self.decl.mode.as_str();
            return self.fail(format!(
                "You can't call .{} after calling .{}.",
                mode.as_str(),
                prev
            ));
        }
        self.decl.mode = mode;
        self
    }

    pub fn abstract_(&mut self) -> &mut Self {
        self.mode(Mode::Abstract)
    }

    pub fn override_(&mut self) -> &mut Self {
        self.mode(Mode::Override)
    }

    pub fn overridable(&mut self) -> &mut Self {
        self.mode(Mode::Overridable)
    }

    pub fn checked(&mut self, level: CheckedLevel) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.decl.checked.is_some() {
            return self.fail("You can't call .checked multiple times in a signature.".to_string());
        }
        self.decl.checked = Some(level);
        self
    }

    /// Complete the declaration, or report the first misuse.
    pub fn finish(self) -> Result<Declaration, ContractError> {
        if let Some(message) = self.error {
            return Err(ContractError::ContractBuild(message));
        }
        if self.decl.returns.is_none() {
            return Err(ContractError::ContractBuild(
                "You must provide a return type; use the `.returns` or `.void` builder methods."
                    .to_string(),
            ));
        }
        Ok(self.decl)
    }
}
