//! Native function table tests
//!
//! Functions built with the builder, reading their frames through the
//! process-wide cast registry.

mod common;

use common::*;
use common::assert_eq;
use scriptargs_runtime::registry::{self, RegistryError};
use scriptargs_runtime::{
    failure, nothing, ArgReader, CallError, CastRegistry, FunctionTable, NativeFunctionBuilder, ToValue, Value,
};
use std::sync::Once;

static INSTALL: Once = Once::new();

fn install_registry() {
    INSTALL.call_once(|| {
        common::registry().install().unwrap();
    });
}

fn module_table() -> FunctionTable {
    let mut table = FunctionTable::new();

    table.register(
        NativeFunctionBuilder::new("getVehicleModel")
            .with_arity(1)
            .with_implementation(|frame| {
                let mut reader = ArgReader::new(frame);
                let vehicle = reader.read_user_data::<Vehicle>();
                match vehicle {
                    Some(vehicle) if !reader.has_errors() => vec![vehicle.model.to_value()],
                    _ => failure(),
                }
            })
            .build()
            .unwrap(),
    );

    table.register(
        NativeFunctionBuilder::new("outputChatBox")
            .variadic()
            .with_implementation(|frame| {
                let mut reader = ArgReader::new(frame);
                let _text = reader.read_any_string();
                let _target = reader.read_user_data_or::<Player>(None);
                if reader.has_errors() {
                    return failure();
                }
                nothing()
            })
            .build()
            .unwrap(),
    );

    table
}

#[test]
fn test_install_is_once_only() {
    install_registry();

    assert!(registry::global().is_registered::<Vehicle>());
    assert_eq!(CastRegistry::default().install().unwrap_err(), RegistryError::AlreadyInstalled);
}

#[test]
fn test_call_through_global_registry() {
    install_registry();
    let table = module_table();

    assert_eq!(
        table.call("getVehicleModel", vec![vehicle(560)]),
        Ok(vec![Value::Number(560.0)])
    );
    assert_eq!(table.call("getVehicleModel", vec![player("eve")]), Ok(failure()));
    assert_eq!(table.call("getVehicleModel", vec![vehicle(1), vehicle(2)]), Ok(failure()));
}

#[test]
fn test_optional_handle_parameter() {
    install_registry();
    let table = module_table();

    assert_eq!(table.call("outputChatBox", vec![Value::string("hi")]), Ok(nothing()));
    assert_eq!(
        table.call("outputChatBox", vec![Value::string("hi"), player("eve")]),
        Ok(nothing())
    );
    assert_eq!(
        table.call("outputChatBox", vec![Value::string("hi"), vehicle(1)]),
        Ok(failure())
    );
}

#[test]
fn test_unknown_function() {
    let table = module_table();

    assert_eq!(
        table.call("destroyElement", vec![]),
        Err(CallError::UnknownFunction("destroyElement".to_string()))
    );
    assert_eq!(
        table.names().collect::<Vec<_>>(),
        vec!["getVehicleModel", "outputChatBox"]
    );
}
