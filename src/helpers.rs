//! Contains the [`Helper`] trait and the [`Registry`] that maps helper
//! names to implementations.
//!
//! A helper is any type which implements the [`Helper`] trait, including
//! plain functions and closures with a matching signature. A template
//! engine integration looks helpers up by name and executes them with an
//! input [`Value`] and an argument map.
//!
//! Helpers follow one calling convention. Filter-style helpers, those a
//! template pipes a value into, receive that value as `input`; helpers
//! called as plain functions receive [`Value::Null`] instead. Anonymous
//! arguments are named "1", "2", and so on, in call order. The piped
//! input, when present, counts as the first parameter, so these two
//! template expressions are equivalent:
//!
//! ```text
//! (( content("home", "title") ))
//! (( "home" | content("title") ))
//! ```
//!
//! [`Registry::with_extension`] registers the full CMS helper set over an
//! [`Extension`]:
//!
//! | name              | parameters                | returns               |
//! |-------------------|---------------------------|-----------------------|
//! | `get`             | url                       | decoded JSON          |
//! | `content`         | category, name, [default] | block text            |
//! | `editable`        | category, name            | edit markup or ""     |
//! | `editable_object` | id                        | edit markup or ""     |
//! | `objects`         | class name                | array of objects      |
//! | `object`          | id                        | one object            |
//! | `option`          | category, name, [default] | option value          |
//! | `cms_asset`       | resource                  | absolute asset URL    |
//! | `cms_object_url`  | class name                | REST listing URL      |
//! | `spaceless`       | markup                    | collapsed markup      |
//! | `filter`          | records, spec             | retained records      |
//! | `filter_all`      | records, spec             | retained records      |

use crate::{
    extension::{spaceless, Extension},
    filter::ListFilter,
    format::Formatter,
    log::{error_missing_argument, error_missing_helper, error_write, Error, INVALID_HELPER},
};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};

/// Describes a type which can be called by name from a template.
pub trait Helper: Sync + Send {
    /// Execute the helper with the given input and arguments, and return
    /// a new Value as output.
    ///
    /// # Errors
    ///
    /// May return an [`Error`] to abort rendering of the surrounding
    /// template.
    fn apply(&self, input: &Value, args: &HashMap<String, Value>) -> Result<Value, Error>;
}

/// Allows any function with a matching signature to be registered as a
/// [`Helper`].
impl<F> Helper for F
where
    F: Fn(&Value, &HashMap<String, Value>) -> Result<Value, Error> + Sync + Send,
{
    fn apply(&self, input: &Value, args: &HashMap<String, Value>) -> Result<Value, Error> {
        self(input, args)
    }
}

/// Maps helper names to [`Helper`] instances.
pub struct Registry {
    /// Helpers that this Registry is aware of.
    helpers: HashMap<String, Box<dyn Helper>>,
}

impl Registry {
    /// Create a new, empty Registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            helpers: HashMap::new(),
        }
    }

    /// Create a new Registry holding the full CMS helper set over the
    /// given [`Extension`].
    pub fn with_extension(extension: Arc<Extension>) -> Self {
        let mut registry = Self::new();

        let ext = Arc::clone(&extension);
        registry.add_helper_must("get", move |input: &Value, args: &Args| {
            let url = param_str("get", input, args, 0, "a url")?;
            ext.get_json(url)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("content", move |input: &Value, args: &Args| {
            let category = param_str("content", input, args, 0, "a category")?;
            let name = param_str("content", input, args, 1, "a block name")?;
            let default = param_str_opt(input, args, 2);
            ext.content(category, name, default).map(Value::String)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("editable", move |input: &Value, args: &Args| {
            let category = param_str("editable", input, args, 0, "a category")?;
            let name = param_str("editable", input, args, 1, "a block name")?;
            ext.editable(category, name).map(Value::String)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("editable_object", move |input: &Value, args: &Args| {
            let id = param_u64("editable_object", input, args, 0, "an object id")?;
            ext.editable_object(id).map(Value::String)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("objects", move |input: &Value, args: &Args| {
            let class_name = param_str("objects", input, args, 0, "a class name")?;
            ext.objects(class_name)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("object", move |input: &Value, args: &Args| {
            let id = param_u64("object", input, args, 0, "an object id")?;
            ext.object(id)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("option", move |input: &Value, args: &Args| {
            let category = param_str("option", input, args, 0, "a category")?;
            let name = param_str("option", input, args, 1, "an option name")?;
            let default = param_str_opt(input, args, 2);
            ext.option(category, name, default).map(Value::String)
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("cms_asset", move |input: &Value, args: &Args| {
            let resource = param_str("cms_asset", input, args, 0, "a resource path")?;
            Ok(json!(ext.cms_asset(resource)))
        });

        let ext = Arc::clone(&extension);
        registry.add_helper_must("cms_object_url", move |input: &Value, args: &Args| {
            let class_name = param_str("cms_object_url", input, args, 0, "a class name")?;
            Ok(json!(ext.cms_object_url(class_name)))
        });

        registry.add_helper_must("spaceless", |input: &Value, args: &Args| {
            let value = param_str("spaceless", input, args, 0, "markup")?;
            Ok(json!(spaceless(value)))
        });

        registry.add_helper_must("filter", |input: &Value, args: &Args| {
            let (records, spec) = filter_params("filter", input, args)?;
            Ok(Value::Array(ListFilter::from_value(spec)?.apply(records)))
        });

        registry.add_helper_must("filter_all", |input: &Value, args: &Args| {
            let (records, spec) = filter_params("filter_all", input, args)?;
            Ok(Value::Array(ListFilter::from_value(spec)?.apply_all(records)))
        });

        registry
    }

    /// Add a [`Helper`].
    ///
    /// # Errors
    ///
    /// If a `Helper` with the given name already exists in the Registry,
    /// an [`Error`] is returned.
    pub fn add_helper<T>(&mut self, name: &str, helper: T) -> Result<(), Error>
    where
        T: Helper + 'static,
    {
        if self.helpers.contains_key(name) {
            return Err(Error::build(INVALID_HELPER).with_help(format!(
                "helper with name `{name}` already exists in registry, \
                overwrite it with `.add_helper_must`"
            )));
        }
        self.helpers.insert(name.to_string(), Box::new(helper));
        Ok(())
    }

    /// Add a [`Helper`].
    ///
    /// If a `Helper` with the given name already exists in the Registry,
    /// it is overwritten.
    #[inline]
    pub fn add_helper_must<T>(&mut self, name: &str, helper: T)
    where
        T: Helper + 'static,
    {
        self.helpers.insert(name.to_string(), Box::new(helper));
    }

    /// Add a [`Helper`].
    ///
    /// Returns the Registry, so additional methods may be chained.
    ///
    /// If a `Helper` with the given name already exists in the Registry,
    /// it is overwritten.
    #[inline]
    pub fn with_helper_must<T>(mut self, name: &str, helper: T) -> Self
    where
        T: Helper + 'static,
    {
        self.add_helper_must(name, helper);
        self
    }

    /// Return the helper with the given name, if it exists in the
    /// Registry.
    #[inline]
    pub fn get_helper(&self, name: &str) -> Option<&dyn Helper> {
        self.helpers.get(name).map(|helper| &**helper)
    }

    /// Execute the named helper with the given input and arguments.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if no helper with the given name exists, or
    /// the helper itself fails.
    pub fn call(
        &self,
        name: &str,
        input: &Value,
        args: &HashMap<String, Value>,
    ) -> Result<Value, Error> {
        let helper = self.get_helper(name).ok_or_else(|| error_missing_helper(name))?;

        helper.apply(input, args).map_err(|error| {
            if error.get_name().is_none() {
                error.with_name(name)
            } else {
                error
            }
        })
    }

    /// Execute the named helper and format its output for template use.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if [`call`][`Registry::call`] fails, or the
    /// output cannot be written.
    pub fn render(
        &self,
        name: &str,
        input: &Value,
        args: &HashMap<String, Value>,
    ) -> Result<String, Error> {
        let value = self.call(name, input, args)?;

        let mut buffer = String::new();
        Formatter::new(&mut buffer)
            .write_value(&value)
            .map_err(|_| error_write())?;
        Ok(buffer)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

type Args = HashMap<String, Value>;

/// Return the parameter at the given zero-based position.
///
/// A non-null input counts as parameter 0, shifting the argument map by
/// one; anonymous arguments are looked up by their "1", "2", ... names.
fn param<'a>(input: &'a Value, args: &'a Args, position: usize) -> Option<&'a Value> {
    if input.is_null() {
        args.get(&(position + 1).to_string())
    } else if position == 0 {
        Some(input)
    } else {
        args.get(&position.to_string())
    }
}

/// Return the parameter at the given position as a string slice.
///
/// # Errors
///
/// Returns an [`Error`] if the parameter is missing or not a string.
fn param_str<'a>(
    helper: &str,
    input: &'a Value,
    args: &'a Args,
    position: usize,
    what: &str,
) -> Result<&'a str, Error> {
    match param(input, args, position) {
        Some(Value::String(string)) => Ok(string),
        Some(other) => Err(error_missing_argument(
            helper,
            format!("{what}, found `{other}`"),
        )),
        None => Err(error_missing_argument(helper, what)),
    }
}

/// Return the parameter at the given position as a string slice, if it
/// exists and is a string.
fn param_str_opt<'a>(input: &'a Value, args: &'a Args, position: usize) -> Option<&'a str> {
    param(input, args, position).and_then(Value::as_str)
}

/// Return the parameter at the given position as a u64.
///
/// # Errors
///
/// Returns an [`Error`] if the parameter is missing or not an unsigned
/// integer.
fn param_u64(
    helper: &str,
    input: &Value,
    args: &Args,
    position: usize,
    what: &str,
) -> Result<u64, Error> {
    match param(input, args, position) {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| error_missing_argument(helper, format!("{what}, found `{value}`"))),
        None => Err(error_missing_argument(helper, what)),
    }
}

/// Return the record collection and filter spec parameters shared by the
/// `filter` and `filter_all` helpers.
///
/// # Errors
///
/// Returns an [`Error`] if the record parameter is missing or not an
/// array, or the spec parameter is missing.
fn filter_params<'a>(
    helper: &str,
    input: &'a Value,
    args: &'a Args,
) -> Result<(&'a Vec<Value>, &'a Value), Error> {
    let records = match param(input, args, 0) {
        Some(Value::Array(array)) => array,
        Some(other) => {
            return Err(error_missing_argument(
                helper,
                format!("an array of records, found `{other}`"),
            ))
        }
        None => return Err(error_missing_argument(helper, "an array of records")),
    };
    let spec = param(input, args, 1)
        .ok_or_else(|| error_missing_argument(helper, "an array of criterion groups"))?;

    Ok((records, spec))
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::{
        client::{Response, RestClient},
        extension::{EditabilityContext, Extension},
        log::Error,
        services::{CompositeObjects, ContentBlocks, Options},
    };
    use serde_json::{json, Value};
    use std::{collections::HashMap, sync::Arc};

    #[test]
    fn test_call_function_style() {
        let registry = get_test_registry();
        let result = registry.call(
            "content",
            &Value::Null,
            &args(&[json!("home"), json!("title")]),
        );

        assert_eq!(result.unwrap(), json!("home/title"));
    }

    #[test]
    fn test_call_filter_style() {
        // The piped value takes the place of the first parameter.
        let registry = get_test_registry();
        let result = registry.call("content", &json!("home"), &args(&[json!("title")]));

        assert_eq!(result.unwrap(), json!("home/title"));
    }

    #[test]
    fn test_call_missing_helper() {
        let registry = get_test_registry();
        assert!(registry.call("ghost", &Value::Null, &HashMap::new()).is_err());
    }

    #[test]
    fn test_call_missing_argument() {
        let registry = get_test_registry();
        let result = registry.call("content", &Value::Null, &args(&[json!("home")]));

        let error = result.unwrap_err();
        assert_eq!(error.get_name(), Some("content"));
    }

    #[test]
    fn test_get() {
        let registry = get_test_registry();
        let result = registry.call("get", &Value::Null, &args(&[json!("/objects")]));

        assert_eq!(result.unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn test_editable_not_editable() {
        let registry = get_test_registry();
        let result = registry.call(
            "editable",
            &Value::Null,
            &args(&[json!("home"), json!("title")]),
        );

        assert_eq!(result.unwrap(), json!(""));
    }

    #[test]
    fn test_objects_and_object() {
        let registry = get_test_registry();

        let objects = registry.call("objects", &Value::Null, &args(&[json!("Event")]));
        assert_eq!(objects.unwrap(), json!([{"class": "Event"}]));

        let object = registry.call("object", &Value::Null, &args(&[json!(3)]));
        assert_eq!(object.unwrap(), json!({"id": 3}));
    }

    #[test]
    fn test_urls() {
        let registry = get_test_registry();

        let asset = registry.call("cms_asset", &json!("logo.png"), &HashMap::new());
        assert_eq!(asset.unwrap(), json!("https://cms.example.com/logo.png"));

        let url = registry.call("cms_object_url", &json!("Event"), &HashMap::new());
        assert_eq!(
            url.unwrap(),
            json!("https://cms.example.com/api/composite-object/objects?className=Event")
        );
    }

    #[test]
    fn test_spaceless() {
        let registry = get_test_registry();
        let result = registry.call("spaceless", &json!("<p>a</p>  <p>b</p>"), &HashMap::new());

        assert_eq!(result.unwrap(), json!("<p>a</p><p>b</p>"));
    }

    #[test]
    fn test_filter() {
        let registry = get_test_registry();
        let records = json!([
            {"id": 1, "type": "page"},
            {"id": 2, "type": "post"},
            {"id": 3, "type": "page"},
        ]);
        let result = registry.call("filter", &records, &args(&[json!([{"type": "page"}])]));

        assert_eq!(
            result.unwrap(),
            json!([{"id": 1, "type": "page"}, {"id": 3, "type": "page"}])
        );
    }

    #[test]
    fn test_filter_all() {
        let registry = get_test_registry();
        let records = json!([{"id": 1}, {"id": 2}]);
        let result = registry.call("filter_all", &records, &args(&[json!([])]));

        assert_eq!(result.unwrap(), records);
    }

    #[test]
    fn test_filter_rejects_malformed_spec() {
        let registry = get_test_registry();
        let result = registry.call("filter", &json!([]), &args(&[json!("type")]));

        assert_eq!(result.unwrap_err().get_name(), Some("filter"));
    }

    #[test]
    fn test_render() {
        let registry = get_test_registry();
        let result = registry.render(
            "option",
            &Value::Null,
            &args(&[json!("theme"), json!("accent")]),
        );

        assert_eq!(result.unwrap(), "theme/accent");
    }

    #[test]
    fn test_add_duplicate() {
        let mut registry = get_test_registry();
        assert!(registry.add_helper("content", faux_helper).is_err());
        assert!(registry.add_helper("brand_new", faux_helper).is_ok());
    }

    #[test]
    fn test_add_overwrite() {
        let registry = get_test_registry().with_helper_must("spaceless", faux_helper);
        let result = registry.call("spaceless", &Value::Null, &HashMap::new());

        assert_eq!(result.unwrap(), json!("faux"));
    }

    /// A Helper used to test Registry.
    fn faux_helper(_: &Value, _: &HashMap<String, Value>) -> Result<Value, Error> {
        Ok(json!("faux"))
    }

    /// Name the given values "1", "2", ... to build an argument map.
    fn args(values: &[Value]) -> HashMap<String, Value> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| ((index + 1).to_string(), value.clone()))
            .collect()
    }

    /// Return a Registry over an Extension with fake collaborators.
    fn get_test_registry() -> Registry {
        let extension = Extension::new(FakeClient, FakeBlocks, FakeOptions, FakeObjects)
            .with_cms_base_url("https://cms.example.com")
            .with_api_base_url("https://cms.example.com/api")
            .with_editability(EditabilityContext::disabled());

        Registry::with_extension(Arc::new(extension))
    }

    struct FakeClient;

    impl RestClient for FakeClient {
        fn get(&self, _: &str) -> Result<Response, Error> {
            Ok(Response::ok(r#"[{"id": 1}]"#))
        }

        fn validate_token(&self, _: &str) -> bool {
            false
        }
    }

    struct FakeBlocks;

    impl ContentBlocks for FakeBlocks {
        fn get(&self, category: &str, name: &str, _: Option<&str>) -> Result<String, Error> {
            Ok(format!("{category}/{name}"))
        }

        fn editable(&self, category: &str, name: &str) -> Result<String, Error> {
            Ok(format!("<edit {category}/{name}>"))
        }
    }

    struct FakeOptions;

    impl Options for FakeOptions {
        fn get(&self, category: &str, name: &str, _: Option<&str>) -> Result<String, Error> {
            Ok(format!("{category}/{name}"))
        }
    }

    struct FakeObjects;

    impl CompositeObjects for FakeObjects {
        fn by_class_name(&self, class_name: &str) -> Result<Value, Error> {
            Ok(json!([{"class": class_name}]))
        }

        fn get(&self, id: u64) -> Result<Value, Error> {
            Ok(json!({"id": id}))
        }

        fn editable(&self, id: u64) -> Result<String, Error> {
            Ok(format!("<edit object {id}>"))
        }
    }
}
