//! Per-element attribute values

use super::StoreGraph;
use crate::graph::attribute::AttributeDescription;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::native::NativeValue;
use crate::graph::types::GraphIndexType;
use crate::graph::value::AttributeValue;

macro_rules! typed_accessors {
    ($($get:ident, $set:ident, $desc_get:ident, $desc_set:ident, $t:ty;)*) => {
        $(
            pub fn $get(&self, attribute: u32, id: u32) -> GraphResult<$t> {
                self.description(attribute, id)?.$desc_get(id)
            }

            pub fn $set(&mut self, attribute: u32, id: u32, value: $t) -> GraphResult<()> {
                self.update_value(attribute, id, |description| description.$desc_set(id, value))
            }
        )*
    };
}

impl StoreGraph {
    typed_accessors! {
        byte_value, set_byte_value, get_byte, set_byte, i8;
        short_value, set_short_value, get_short, set_short, i16;
        int_value, set_int_value, get_int, set_int, i32;
        long_value, set_long_value, get_long, set_long, i64;
        float_value, set_float_value, get_float, set_float, f32;
        double_value, set_double_value, get_double, set_double, f64;
        boolean_value, set_boolean_value, get_boolean, set_boolean, bool;
        char_value, set_char_value, get_char, set_char, char;
    }

    /// The value boxed as an [`AttributeValue`].
    pub fn object_value(&self, attribute: u32, id: u32) -> GraphResult<AttributeValue> {
        Ok(self.description(attribute, id)?.get_object(id))
    }

    /// Sets the value from a boxed value. `Null` clears it.
    pub fn set_object_value(
        &mut self,
        attribute: u32,
        id: u32,
        value: &AttributeValue,
    ) -> GraphResult<()> {
        self.update_value(attribute, id, |description| description.set_object(id, value))
    }

    /// The value in its string form; `None` for a cleared object value.
    pub fn string_value(&self, attribute: u32, id: u32) -> GraphResult<Option<String>> {
        Ok(self.description(attribute, id)?.get_string(id))
    }

    /// Parses and stores a string. `None` resets the slot to the default.
    pub fn set_string_value(
        &mut self,
        attribute: u32,
        id: u32,
        value: Option<&str>,
    ) -> GraphResult<()> {
        self.update_value(attribute, id, |description| description.set_string(id, value))
    }

    pub fn native_value(&self, attribute: u32, id: u32) -> GraphResult<NativeValue> {
        Ok(self.description(attribute, id)?.get_native(id))
    }

    pub fn set_native_value(&mut self, attribute: u32, id: u32, value: NativeValue) -> GraphResult<()> {
        self.update_value(attribute, id, |description| description.set_native(id, value))
    }

    /// Copies the value of `source` onto `destination` in its native form.
    pub fn copy_value(&mut self, attribute: u32, source: u32, destination: u32) -> GraphResult<()> {
        self.description(attribute, source)?;
        self.update_value(attribute, destination, |description| {
            description
                .native_type()
                .copy_attribute_value(description, source, destination)
        })
    }

    /// Resets the slot to the attribute's default.
    pub fn clear_value(&mut self, attribute: u32, id: u32) -> GraphResult<()> {
        self.update_value(attribute, id, |description| {
            description.clear(id);
            Ok(())
        })
    }

    pub fn is_default_value(&self, attribute: u32, id: u32) -> GraphResult<bool> {
        Ok(self.description(attribute, id)?.is_clear(id))
    }

    /// `None` when `value` would parse for this attribute, otherwise the
    /// reason it would not.
    pub fn accepts_string_value(
        &self,
        attribute: u32,
        value: Option<&str>,
    ) -> GraphResult<Option<String>> {
        Ok(self.slot(attribute)?.description.accepts_string(value))
    }

    /// Net number of value changes made through this attribute.
    pub fn value_modification_counter(&self, attribute: u32) -> GraphResult<i64> {
        Ok(self.slot(attribute)?.value_counter)
    }

    pub fn set_value_modification_counter(&mut self, attribute: u32, counter: i64) -> GraphResult<()> {
        self.slot_mut(attribute)?.value_counter = counter;
        Ok(())
    }

    fn description(&self, attribute: u32, id: u32) -> GraphResult<&dyn AttributeDescription> {
        let slot = self.slot(attribute)?;
        if id as usize >= slot.description.capacity() {
            return Err(GraphError::ElementNotFound {
                element_type: slot.metadata.element_type,
                id,
            });
        }
        Ok(slot.description.as_ref())
    }

    /// Applies one write, then reports it to the edit sink, the index, the
    /// counters and the key set. A write that leaves the value unchanged is
    /// not reported when a sink is attached.
    fn update_value<F>(&mut self, attribute: u32, id: u32, apply: F) -> GraphResult<()>
    where
        F: FnOnce(&mut dyn AttributeDescription) -> GraphResult<()>,
    {
        self.description(attribute, id)?;
        let recording = self.graph_edit.is_some();

        let (native_type, old, new) = {
            let slot = self.slot_mut(attribute)?;
            let description = slot.description.as_mut();
            let native_type = description.native_type();
            let old = recording.then(|| description.get_native(id));
            apply(&mut *description)?;
            let new = recording.then(|| description.get_native(id));
            (native_type, old, new)
        };

        let changed = match (self.graph_edit.as_deref_mut(), old, new) {
            (Some(edit), Some(old), Some(new)) => {
                native_type.add_edit_if_changed(edit, attribute, id, old, new)
            }
            _ => true,
        };
        if changed {
            self.value_changed(attribute, id)?;
        }
        Ok(())
    }

    fn value_changed(&mut self, attribute: u32, id: u32) -> GraphResult<()> {
        let increment = self.increment();
        let slot = self.slot_mut(attribute)?;
        let element_type = slot.metadata.element_type;
        if slot.index_type != GraphIndexType::None {
            let value = slot.description.get_object(id);
            slot.index.update_element(id, &value);
        }
        slot.value_counter += increment;
        let key_type = slot.key_type;
        self.global_counter += increment;

        if key_type.is_some() && element_type.element_exists(self, id) {
            self.mark_key_dirty(element_type, id);
        }
        Ok(())
    }
}
