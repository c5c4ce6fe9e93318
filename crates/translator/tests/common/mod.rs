#![allow(dead_code)]

use efx_core::{Result, SymbolCatalog};
use efx_translator::{XPathScriptGenerator, translate_expression};

const SYMBOLS: &str = r#"{
    "version": "test",
    "nodes": {
        "ND-Root": { "xpath": "/*" },
        "ND-SubNode": { "xpath": "/*/SubNode" }
    },
    "fields": {
        "BT-00-Text": { "xpath": "/*/PathNode/TextField", "type": "text" },
        "BT-00-Code": { "xpath": "/*/PathNode/CodeField", "type": "code", "codelist": "accessibility" },
        "BT-00-Internal-Code": { "xpath": "/*/PathNode/InternalCodeField", "type": "internal-code", "codelist": "main-activity" },
        "BT-00-Indicator": { "xpath": "/*/PathNode/IndicatorField", "type": "indicator" },
        "BT-00-Integer": { "xpath": "/*/PathNode/IntegerField", "type": "integer" },
        "BT-00-Number": { "xpath": "/*/PathNode/NumberField", "type": "number" },
        "BT-00-StartDate": { "xpath": "/*/PathNode/StartDateField", "type": "date" },
        "BT-00-EndDate": { "xpath": "/*/PathNode/EndDateField", "type": "date" },
        "BT-00-StartTime": { "xpath": "/*/PathNode/StartTimeField", "type": "time" },
        "BT-00-Measure": { "xpath": "/*/PathNode/MeasureField", "type": "measure" },
        "BT-00-Attribute": { "xpath": "/*/PathNode/TextField/@Attribute", "type": "text" },
        "BT-00-CodeAttribute": { "xpath": "/*/PathNode/CodeField", "type": "code", "attribute": "listName" },
        "BT-00-Binary": { "xpath": "/*/PathNode/BinaryField", "type": "binary" },
        "BT-01-SubNode-Text": { "xpath": "/*/SubNode/SubTextField", "type": "text" }
    },
    "codelists": {
        "accessibility": { "codes": ["inclus", "n-inclus", "n-inclu-just"] },
        "main-activity": { "parent": "main-activity-base", "codes": ["gas", "oil"] },
        "main-activity-base": { "codes": ["gas", "oil", "port"] }
    }
}"#;

pub fn symbols() -> SymbolCatalog {
    SymbolCatalog::from_json(SYMBOLS).expect("test catalog is valid JSON")
}

pub fn translate(context: &str, expression: &str) -> Result<String> {
    translate_expression(&symbols(), &XPathScriptGenerator::new(), context, expression)
}
