//! Conversion of registered definitions into [`actcli_metadata`] models.

use actcli_metadata::{ActionMeta, AppMeta, OptionMeta, SignatureMeta};

use crate::action::ActionDef;
use crate::app::App;
use crate::arity::HandlerSignature;
use crate::option::OptionDef;

pub(crate) fn app_meta(app: &App) -> AppMeta {
    let mut meta = AppMeta::new(app.script_name());
    meta.description = app.desc().unwrap_or_default().to_string();
    meta.version = app.version_str().unwrap_or_default().to_string();
    meta.default_action = app.default_action_name().map(str::to_string);
    meta.global = app.registry().global().map(action_meta);
    meta.actions = app.registry().actions().iter().map(action_meta).collect();
    meta
}

pub fn action_meta(action: &ActionDef) -> ActionMeta {
    ActionMeta {
        name: action.name().to_string(),
        alias: action.alias().map(str::to_string),
        argdef: action.argdef().map(str::to_string),
        description: action.desc().unwrap_or_default().to_string(),
        doc: action.doc().unwrap_or_default().to_string(),
        options: action.options().iter().map(option_meta).collect(),
        signature: signature_meta(action.signature()),
    }
}

pub fn option_meta(option: &OptionDef) -> OptionMeta {
    OptionMeta {
        name: option.name(),
        short: option.short().map(String::from),
        long: option.long().map(str::to_string),
        arg_name: option.arg_name().map(str::to_string),
        arg_requirement: option.requirement().as_str().to_string(),
        arg_type: option.arg_type_tag().map(str::to_string),
        help: option.desc().to_string(),
        usage: option.format(),
    }
}

pub fn signature_meta(signature: &HandlerSignature) -> SignatureMeta {
    SignatureMeta {
        params: signature.params().to_vec(),
        min_args: signature.min_args(),
        max_args: (!signature.is_variadic()).then(|| signature.max_args()),
        variadic: signature.is_variadic(),
    }
}
