use crate::domain::model::{OrderRecord, ReviewThresholds, ReviewUrgency, Weight};
use crate::domain::pricing::PriceSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Weight,
    CustomerName,
    DeliveryAddress,
}

impl EditableField {
    pub const ALL: [EditableField; 3] = [
        EditableField::Weight,
        EditableField::CustomerName,
        EditableField::DeliveryAddress,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Viewing,
    Editing {
        pending: String,
    },
}

#[derive(Debug, Clone, Default)]
struct FieldSlot {
    value: String,
    state: FieldState,
}

impl FieldSlot {
    fn new(value: String) -> Self {
        Self {
            value,
            state: FieldState::Viewing,
        }
    }

    fn current(&self) -> &str {
        match &self.state {
            FieldState::Viewing => &self.value,
            FieldState::Editing { pending } => pending,
        }
    }

    fn begin(&mut self) {
        if self.state == FieldState::Viewing {
            self.state = FieldState::Editing {
                pending: self.value.clone(),
            };
        }
    }

    fn commit(&mut self) {
        if let FieldState::Editing { pending } = std::mem::take(&mut self.state) {
            self.value = pending;
        }
    }
}

/// An extraction result the operator has not confirmed yet.
///
/// Weight, customer name and delivery address are editable, each with its own
/// viewing/editing state. Price follows the weight text on every change.
#[derive(Debug, Clone)]
pub struct Draft {
    original: OrderRecord,
    schedule: PriceSchedule,
    weight: FieldSlot,
    customer_name: FieldSlot,
    delivery_address: FieldSlot,
    price: f64,
}

impl Draft {
    pub fn new(original: OrderRecord, schedule: PriceSchedule) -> Self {
        let price = schedule.price_for_weight(&original.weight);
        Self {
            weight: FieldSlot::new(original.weight.to_string()),
            customer_name: FieldSlot::new(original.customer_name.clone()),
            delivery_address: FieldSlot::new(original.delivery_address.clone()),
            original,
            schedule,
            price,
        }
    }

    pub fn original(&self) -> &OrderRecord {
        &self.original
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn urgency(&self, thresholds: &ReviewThresholds) -> ReviewUrgency {
        ReviewUrgency::from_confidence(self.original.confidence, thresholds)
    }

    /// Pending text while editing, otherwise the working value.
    pub fn value(&self, field: EditableField) -> &str {
        self.slot(field).current()
    }

    pub fn field_state(&self, field: EditableField) -> &FieldState {
        &self.slot(field).state
    }

    pub fn begin_edit(&mut self, field: EditableField) {
        self.slot_mut(field).begin();
    }

    /// Replaces the field's pending text, entering edit mode if needed.
    pub fn input(&mut self, field: EditableField, text: &str) {
        self.slot_mut(field).state = FieldState::Editing {
            pending: text.to_string(),
        };

        if field == EditableField::Weight {
            self.recompute_price(text);
        }
    }

    pub fn finish_edit(&mut self, field: EditableField) {
        self.slot_mut(field).commit();
    }

    /// Commits any open edits and builds the ledger record.
    ///
    /// Service name, order number, confidence, timestamp and photo references come from
    /// the extraction untouched.
    pub fn confirm(mut self) -> OrderRecord {
        for field in EditableField::ALL {
            self.finish_edit(field);
        }

        let weight = Weight::from_text(&self.weight.value);
        let price = self.schedule.price_for_weight(&weight);
        if weight.is_unclear() {
            tracing::warn!(
                "Order {} confirmed without a readable weight, price set to 0",
                self.original.timestamp
            );
        }

        OrderRecord {
            customer_name: self.customer_name.value,
            delivery_address: self.delivery_address.value,
            weight,
            price: Some(price),
            ..self.original
        }
    }

    pub fn discard(self) {
        tracing::info!("Draft {} discarded", self.original.timestamp);
    }

    // 輸入無法解析時價格歸零，不沿用上一次的價格
    fn recompute_price(&mut self, weight_text: &str) {
        self.price = Weight::parse_kg(weight_text)
            .map(|kg| self.schedule.price_for(kg))
            .unwrap_or(0.0);
    }

    fn slot(&self, field: EditableField) -> &FieldSlot {
        match field {
            EditableField::Weight => &self.weight,
            EditableField::CustomerName => &self.customer_name,
            EditableField::DeliveryAddress => &self.delivery_address,
        }
    }

    fn slot_mut(&mut self, field: EditableField) -> &mut FieldSlot {
        match field {
            EditableField::Weight => &mut self.weight,
            EditableField::CustomerName => &mut self.customer_name,
            EditableField::DeliveryAddress => &mut self.delivery_address,
        }
    }
}
