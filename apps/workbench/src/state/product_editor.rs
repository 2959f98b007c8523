//! # Product Editor
//!
//! State behind one product form: the text fields, the BoM lines and the
//! live costing preview.
//!
//! Every mutation recomputes the costing before it returns, so
//! [`ProductEditor::costing`] always matches the current lines and
//! percentages.
//!
//! ## Modes
//! ```text
//! ┌─────────────┬──────────────────────────────┬───────────────────────────┐
//! │ Mode        │ Starts from                  │ Saves as                  │
//! ├─────────────┼──────────────────────────────┼───────────────────────────┤
//! │ New         │ empty form, default %        │ insert                    │
//! │ Edit        │ saved product                │ update (BoM replaced)     │
//! │ Copy        │ saved product, name cleared  │ insert, new name required │
//! │ Simulation  │ saved product                │ never saved               │
//! └─────────────┴──────────────────────────────┴───────────────────────────┘
//! ```

use serde::Serialize;

use hpp_core::format::parse_leading_number;
use hpp_core::forms::{validate_product_form, ProductForm, ProductFormMode};
use hpp_core::{compute_all, BomLine, CostBreakdown, FieldErrors, Material, Product, ProductDraft};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEditor {
    mode: ProductFormMode,
    form: ProductForm,
    lines: Vec<BomLine>,
    costing: CostBreakdown,
    simulation: bool,
}

impl ProductEditor {
    /// Empty form for a new product, pre-filled with the given percentages.
    pub fn new_product(overhead_percentage: f64, target_margin_percentage: f64) -> Self {
        let form = ProductForm {
            overhead_percentage: overhead_percentage.to_string(),
            target_margin_percentage: target_margin_percentage.to_string(),
            ..ProductForm::default()
        };
        Self::build(ProductFormMode::New, form, Vec::new(), false)
    }

    /// Form for changing a saved product.
    pub fn edit(product: &Product) -> Self {
        Self::build(
            ProductFormMode::Edit {
                id: product.id.clone(),
            },
            ProductForm::from_product(product),
            product.bom_lines(),
            false,
        )
    }

    /// Form for a new product duplicated from `product`.
    ///
    /// The name starts empty and must differ from the original's.
    pub fn copy(product: &Product) -> Self {
        let form = ProductForm {
            name: String::new(),
            ..ProductForm::from_product(product)
        };
        Self::build(
            ProductFormMode::Copy {
                original_name: product.name.clone(),
            },
            form,
            product.bom_lines(),
            false,
        )
    }

    /// Editor for trying other prices and percentages on a saved product.
    pub fn simulate(product: &Product) -> Self {
        Self {
            simulation: true,
            ..Self::edit(product)
        }
    }

    fn build(mode: ProductFormMode, form: ProductForm, lines: Vec<BomLine>, simulation: bool) -> Self {
        let mut editor = ProductEditor {
            mode,
            form,
            lines,
            costing: CostBreakdown::default(),
            simulation,
        };
        editor.recompute();
        editor
    }

    // ===== Accessors =====

    pub fn mode(&self) -> &ProductFormMode {
        &self.mode
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn lines(&self) -> &[BomLine] {
        &self.lines
    }

    /// Costing of the current lines and percentages.
    pub fn costing(&self) -> CostBreakdown {
        self.costing
    }

    pub fn is_simulation(&self) -> bool {
        self.simulation
    }

    // ===== Form fields =====

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    /// Updates the overhead text; the leading number, sign kept,
    /// is previewed and text without one previews as 0%.
    pub fn set_overhead(&mut self, text: impl Into<String>) {
        self.form.overhead_percentage = text.into();
        self.recompute();
    }

    /// Updates the margin text; the leading number, sign kept,
    /// is previewed and text without one previews as 0%.
    pub fn set_margin(&mut self, text: impl Into<String>) {
        self.form.target_margin_percentage = text.into();
        self.recompute();
    }

    // ===== BoM lines =====

    /// Appends a blank line and returns its index.
    pub fn add_line(&mut self) -> usize {
        self.lines.push(BomLine::blank());
        self.recompute();
        self.lines.len() - 1
    }

    /// Removes line `index`; false when out of range.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        self.recompute();
        true
    }

    /// Points line `index` at `material` and copies its standard price.
    ///
    /// The copied price is a snapshot; later edits of the material do not
    /// reach this line.
    pub fn select_material(&mut self, index: usize, material: &Material) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.material_id = material.id.clone();
        line.price = material.standard_price;
        self.recompute();
        true
    }

    pub fn set_price(&mut self, index: usize, price: f64) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.price = price;
        self.recompute();
        true
    }

    pub fn set_quantity(&mut self, index: usize, quantity: f64) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.quantity = quantity;
        self.recompute();
        true
    }

    // ===== Submit =====

    /// Runs every form check against the other saved products.
    pub fn validate(&self, existing: &[Product]) -> Result<ProductDraft, FieldErrors> {
        validate_product_form(&self.form, &self.lines, existing, &self.mode)
    }

    fn recompute(&mut self) {
        self.costing = compute_all(
            &self.lines,
            parse_leading_number(&self.form.overhead_percentage).unwrap_or(0.0),
            parse_leading_number(&self.form.target_margin_percentage).unwrap_or(0.0),
        );
    }
}
