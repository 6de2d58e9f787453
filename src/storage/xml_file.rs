use super::{InventoryReader, StorageError};
use crate::inventory::{Field, FieldValue, InventoryError, Record, ValueKind};
use roxmltree::{Document, Node};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tags and attributes read inside a `<Dealer>` element, outside any vehicle.
const DEALER_TAGS: [(&str, Field); 2] = [("id", Field::DealershipId), ("name", Field::DealershipName)];

/// Tags and attributes read inside a `<Vehicle>` element.
const VEHICLE_TAGS: [(&str, Field); 6] = [
    ("type", Field::VehicleType),
    ("id", Field::VehicleId),
    ("unit", Field::PriceUnit),
    ("price", Field::Price),
    ("model", Field::VehicleModel),
    ("make", Field::VehicleManufacturer),
];

/// Read-only XML adapter.
///
/// Every `<Vehicle>` inside a `<Dealer>` becomes one record carrying the
/// dealer's id and name. Values may be given as child elements or as
/// attributes; tag names compare case-insensitively and unknown tags are
/// looked through.
#[derive(Debug, Clone)]
pub struct XmlInventory {
    path: PathBuf,
}

impl XmlInventory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_text(text: &str) -> Result<Vec<Record>, StorageError> {
        let document = Document::parse(text)?;

        let mut dealers = Vec::new();
        collect(document.root_element(), &[], &mut Record::new(), Some("dealer"), &mut dealers);

        let mut records = Vec::new();
        for dealer in dealers {
            let mut dealer_record = Record::new();
            let mut vehicles = Vec::new();
            collect(dealer, &DEALER_TAGS, &mut dealer_record, Some("vehicle"), &mut vehicles);

            for vehicle in vehicles {
                let mut record = dealer_record.clone();
                collect(vehicle, &VEHICLE_TAGS, &mut record, None, &mut Vec::new());
                records.push(record);
            }
        }

        Ok(records)
    }
}

impl InventoryReader for XmlInventory {
    fn read_inventory(&self) -> Result<Vec<Record>, StorageError> {
        let text = fs::read_to_string(&self.path)?;
        let records = Self::from_text(&text)?;
        debug!(path = %self.path.display(), records = records.len(), "xml inventory read");
        Ok(records)
    }
}

/// Walks `node`, filling `record` from `tags`. Elements named `stop` are
/// collected into `halted` and not entered.
fn collect<'a, 'input>(
    node: Node<'a, 'input>,
    tags: &[(&str, Field)],
    record: &mut Record,
    stop: Option<&str>,
    halted: &mut Vec<Node<'a, 'input>>,
) {
    if !node.is_element() {
        return;
    }

    let name = node.tag_name().name();
    if stop.is_some_and(|stop| name.eq_ignore_ascii_case(stop)) {
        halted.push(node);
        return;
    }

    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    read_value(tags, record, name, &text);

    for child in node.children() {
        collect(child, tags, record, stop, halted);
    }

    for attribute in node.attributes() {
        read_value(tags, record, attribute.name(), attribute.value());
    }
}

/// Values that do not parse as the field's kind stay as raw text; a second,
/// different value for a field already read marks the record as failed.
fn read_value(tags: &[(&str, Field)], record: &mut Record, name: &str, raw: &str) {
    let Some((tag, field)) = tags
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
    else {
        return;
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }

    let value = match field.kind() {
        ValueKind::Long => raw
            .parse::<i64>()
            .map_or_else(|_| FieldValue::Text(raw.to_string()), FieldValue::Long),
        _ => FieldValue::Text(raw.to_string()),
    };

    match record.get(*field) {
        Some(existing) if *existing != value => {
            let detail = format!(
                "tag {tag} already holds [{}] and can not also hold [{raw}]",
                existing.display_text()
            );
            record.attach_error(InventoryError::InvalidArgument(detail));
        }
        Some(_) => {}
        None => {
            record.insert_raw(*field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Dealers>
    <Dealer id="485">
        <Name>Downtown Motors</Name>
        <Vehicle type="suv" id="848432">
            <Price unit="dollars">17000</Price>
            <Make>Land Rover</Make>
            <Model>Range Rover</Model>
        </Vehicle>
        <Vehicle type="sports car" id="V2">
            <Price>cheap</Price>
            <Model>Carrera</Model>
        </Vehicle>
    </Dealer>
    <Dealer id="12513">
        <vehicle TYPE="pickup" ID="V3">
            <price>22000</price>
            <model>F-150</model>
        </vehicle>
    </Dealer>
</Dealers>
"#;

    #[test]
    fn vehicles_inherit_their_dealer_fields() {
        let records = XmlInventory::from_text(SAMPLE).expect("xml parses");
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.get_typed::<String>(Field::DealershipId).as_deref(), Ok("485"));
        assert_eq!(
            first.get_typed::<String>(Field::DealershipName).as_deref(),
            Ok("Downtown Motors")
        );
        assert_eq!(first.get_typed::<String>(Field::VehicleId).as_deref(), Ok("848432"));
        assert_eq!(first.get_typed::<String>(Field::VehicleType).as_deref(), Ok("suv"));
        assert_eq!(first.get_typed::<i64>(Field::Price), Ok(17_000));
        assert_eq!(first.get_typed::<String>(Field::PriceUnit).as_deref(), Ok("dollars"));
        assert_eq!(
            first.get_typed::<String>(Field::VehicleManufacturer).as_deref(),
            Ok("Land Rover")
        );

        let third = &records[2];
        assert_eq!(third.get_typed::<String>(Field::DealershipId).as_deref(), Ok("12513"));
        assert!(!third.contains(Field::DealershipName));
        assert_eq!(third.get_typed::<i64>(Field::Price), Ok(22_000));
    }

    #[test]
    fn unparseable_price_stays_raw() {
        let records = XmlInventory::from_text(SAMPLE).expect("xml parses");
        assert_eq!(
            records[1].get(Field::Price),
            Some(&FieldValue::Text("cheap".to_string()))
        );
        assert!(records[1].error_reason().is_none());
    }

    #[test]
    fn conflicting_values_fail_the_record() {
        let xml = r#"<Dealer id="D1"><Vehicle id="V1" type="suv">
            <Model>X</Model><Model>Y</Model><Price>100</Price>
        </Vehicle></Dealer>"#;
        let records = XmlInventory::from_text(xml).expect("xml parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get_typed::<String>(Field::VehicleModel).as_deref(), Ok("X"));
        assert!(matches!(
            records[0].error_reason(),
            Some(InventoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn repeated_equal_values_are_accepted() {
        let xml = r#"<Dealer id="D1"><Id>D1</Id><Vehicle id="V1"><Id>V1</Id></Vehicle></Dealer>"#;
        let records = XmlInventory::from_text(xml).expect("xml parses");
        assert!(records[0].error_reason().is_none());
        assert_eq!(records[0].get_typed::<String>(Field::VehicleId).as_deref(), Ok("V1"));
    }

    #[test]
    fn broken_markup_is_a_storage_error() {
        assert!(matches!(
            XmlInventory::from_text("<Dealer><Vehicle></Dealer>"),
            Err(StorageError::Xml(_))
        ));
    }
}
