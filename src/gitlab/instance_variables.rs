use super::Client;
use crate::core::client::Client as HttpClient;
use crate::core::error::Result;
use crate::core::request::{null_as_default, ListOptions, Page, RequestOption, Response};
use derive_builder::Builder;
use derive_more::Display;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const VARIABLES_PATH: &str = "admin/ci/variables";

#[derive(Debug, Clone, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariableType {
    #[default]
    #[display(fmt = "env_var")]
    EnvVar,

    #[display(fmt = "file")]
    File,

    /// A type added by a newer GitLab, passed through as is.
    #[display(fmt = "{}", _0)]
    Other(String),
}

impl From<String> for VariableType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "env_var" => VariableType::EnvVar,
            "file" => VariableType::File,
            _ => VariableType::Other(s),
        }
    }
}

impl From<VariableType> for String {
    fn from(variable_type: VariableType) -> Self {
        variable_type.to_string()
    }
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Err("variable type cannot be empty".to_owned()),
            "env_var" | "env" => Ok(VariableType::EnvVar),
            "file" => Ok(VariableType::File),
            _ => Ok(VariableType::Other(s.to_owned())),
        }
    }
}

/// An instance level CI/CD variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceVariable {
    pub key: String,
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variable_type: VariableType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protected: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub masked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: bool,
    #[serde(default)]
    pub description: Option<String>,
}

pub type ListInstanceVariablesOptions = ListOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct CreateInstanceVariableOptions {
    #[builder(setter(into))]
    pub key: String,
    #[builder(setter(into))]
    pub value: String,
    #[builder(default, setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,
}

impl CreateInstanceVariableOptions {
    pub fn builder() -> CreateInstanceVariableOptionsBuilder {
        CreateInstanceVariableOptionsBuilder::default()
    }
}

/// Fields to change on an existing variable. Unset fields are left alone
/// by the server; the key itself cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Builder)]
#[builder(default)]
pub struct UpdateInstanceVariableOptions {
    #[builder(setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[builder(setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[builder(setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[builder(setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[builder(setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[builder(setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,
}

impl UpdateInstanceVariableOptions {
    pub fn builder() -> UpdateInstanceVariableOptionsBuilder {
        UpdateInstanceVariableOptionsBuilder::default()
    }
}

/// Instance level CI/CD variables, `/admin/ci/variables`.
#[allow(async_fn_in_trait)]
pub trait InstanceVariables {
    async fn list_variables(
        &self,
        opt: &ListInstanceVariablesOptions,
        options: &[RequestOption],
    ) -> Result<Page<InstanceVariable>>;

    async fn get_variable(&self, key: &str, options: &[RequestOption]) -> Result<InstanceVariable>;

    async fn create_variable(
        &self,
        opt: &CreateInstanceVariableOptions,
        options: &[RequestOption],
    ) -> Result<InstanceVariable>;

    async fn update_variable(
        &self,
        key: &str,
        opt: &UpdateInstanceVariableOptions,
        options: &[RequestOption],
    ) -> Result<InstanceVariable>;

    async fn remove_variable(&self, key: &str, options: &[RequestOption]) -> Result<()>;
}

pub struct InstanceVariablesService<'c> {
    client: &'c HttpClient<'c>,
}

const _: fn() = || {
    fn assert_impl<T: InstanceVariables>() {}
    assert_impl::<InstanceVariablesService<'static>>();
};

impl<'c> InstanceVariablesService<'c> {
    pub fn new(client: &'c HttpClient<'c>) -> Self {
        Self { client }
    }
}

impl InstanceVariables for InstanceVariablesService<'_> {
    async fn list_variables(
        &self,
        opt: &ListInstanceVariablesOptions,
        options: &[RequestOption],
    ) -> Result<Page<InstanceVariable>> {
        let url = self.client.endpoint(VARIABLES_PATH, None::<&str>)?;
        let request = self.client.new_request(Method::GET, url, Some(opt), options)?;

        let response: Response<Vec<InstanceVariable>> = self.client.execute(request).await?;

        Ok(response.into())
    }

    async fn get_variable(&self, key: &str, options: &[RequestOption]) -> Result<InstanceVariable> {
        let url = self.client.endpoint(VARIABLES_PATH, [key])?;

        self.client.get(url, options).await.map(Response::into_data)
    }

    async fn create_variable(
        &self,
        opt: &CreateInstanceVariableOptions,
        options: &[RequestOption],
    ) -> Result<InstanceVariable> {
        let url = self.client.endpoint(VARIABLES_PATH, None::<&str>)?;
        let request = self.client.new_request(Method::POST, url, Some(opt), options)?;

        self.client.execute(request).await.map(Response::into_data)
    }

    async fn update_variable(
        &self,
        key: &str,
        opt: &UpdateInstanceVariableOptions,
        options: &[RequestOption],
    ) -> Result<InstanceVariable> {
        let url = self.client.endpoint(VARIABLES_PATH, [key])?;
        let request = self.client.new_request(Method::PUT, url, Some(opt), options)?;

        self.client.execute(request).await.map(Response::into_data)
    }

    async fn remove_variable(&self, key: &str, options: &[RequestOption]) -> Result<()> {
        let url = self.client.endpoint(VARIABLES_PATH, [key])?;
        let request = self.client.new_request(Method::DELETE, url, None::<&()>, options)?;

        self.client.execute_empty(request).await.map(Response::into_data)
    }
}

impl<'a> Client<'a> {
    pub fn instance_variables(&self) -> InstanceVariablesService<'_> {
        InstanceVariablesService::new(&self.http_client)
    }
}
