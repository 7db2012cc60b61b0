//! 表达式类型定义
//!
//! 计算节点、过滤条件与优化规则共同使用的带标签表达式树。
//! 序列化为 AST 节点形式：`{"type": "function call", "name": ..., "subNodes": [...]}`

use std::fmt;

use serde_json::{json, Value};

use crate::core::error::{PlanError, PlanResult};
use crate::core::types::json_utils::{as_object, field, get_array, get_str};
use crate::core::types::operators::BinaryOperator;
use crate::core::types::variable::{
    replace_variable, VarSet, VariableRef, VariableRegistry, VariableReplacements,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // 字面量
    Literal(Value),

    // 变量和属性
    Variable(VariableRef),
    Property {
        object: Box<Expression>,
        property: String,
    },

    // 二元操作
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    // 函数调用，名称统一为大写
    Function {
        name: String,
        args: Vec<Expression>,
    },

    // 容器类型
    List(Vec<Expression>),
    Map(Vec<(String, Expression)>),

    // 绑定参数 @name
    Parameter(String),
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn variable(var: &VariableRef) -> Self {
        Expression::Variable(var.clone())
    }

    pub fn property(object: Expression, property: impl Into<String>) -> Self {
        Expression::Property {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// `var.a.b.c` 形式的属性路径
    pub fn attribute_path(var: &VariableRef, path: &[&str]) -> Self {
        path.iter()
            .fold(Expression::variable(var), |acc, p| Expression::property(acc, *p))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into().to_uppercase(),
            args,
        }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Expression::Parameter(name.into())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Expression::Variable(_))
    }

    /// 不引用任何变量的表达式视为常量
    pub fn is_constant(&self) -> bool {
        let mut vars = VarSet::new();
        self.collect_variables(&mut vars);
        vars.is_empty()
    }

    /// 函数调用的名称与参数
    pub fn as_function_call(&self) -> Option<(&str, &[Expression])> {
        match self {
            Expression::Function { name, args } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }

    /// 子表达式（按序列化时 subNodes 的顺序）
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::Variable(_) | Expression::Parameter(_) => {
                Vec::new()
            }
            Expression::Property { object, .. } => vec![object.as_ref()],
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Function { args, .. } => args.iter().collect(),
            Expression::List(items) => items.iter().collect(),
            Expression::Map(entries) => entries.iter().map(|(_, v)| v).collect(),
        }
    }

    /// 收集表达式引用的全部变量
    pub fn collect_variables(&self, out: &mut VarSet) {
        if let Expression::Variable(var) = self {
            out.insert(var.id);
        }
        for child in self.children() {
            child.collect_variables(out);
        }
    }

    pub fn variables(&self) -> VarSet {
        let mut out = VarSet::new();
        self.collect_variables(&mut out);
        out
    }

    /// 按替换表替换变量引用
    pub fn replace_variables(&mut self, replacements: &VariableReplacements) {
        match self {
            Expression::Variable(var) => replace_variable(var, replacements),
            Expression::Literal(_) | Expression::Parameter(_) => {}
            Expression::Property { object, .. } => object.replace_variables(replacements),
            Expression::Binary { left, right, .. } => {
                left.replace_variables(replacements);
                right.replace_variables(replacements);
            }
            Expression::Function { args, .. } | Expression::List(args) => {
                for arg in args {
                    arg.replace_variables(replacements);
                }
            }
            Expression::Map(entries) => {
                for (_, value) in entries {
                    value.replace_variables(replacements);
                }
            }
        }
    }

    pub fn to_json(&self) -> Value {
        let sub_nodes = |items: Vec<&Expression>| -> Value {
            Value::Array(items.into_iter().map(Expression::to_json).collect())
        };
        match self {
            Expression::Literal(value) => json!({"type": "value", "value": value}),
            Expression::Variable(var) => json!({"type": "reference", "variable": var.to_json()}),
            Expression::Property { object, property } => json!({
                "type": "attribute access",
                "name": property,
                "subNodes": [object.to_json()],
            }),
            Expression::Binary { left, op, right } => json!({
                "type": "binary operator",
                "operator": op.symbol(),
                "subNodes": [left.to_json(), right.to_json()],
            }),
            Expression::Function { name, args } => json!({
                "type": "function call",
                "name": name,
                "subNodes": sub_nodes(args.iter().collect()),
            }),
            Expression::List(items) => json!({
                "type": "array",
                "subNodes": sub_nodes(items.iter().collect()),
            }),
            Expression::Map(entries) => {
                let elements: Vec<Value> = entries
                    .iter()
                    .map(|(key, value)| {
                        json!({
                            "type": "object element",
                            "name": key,
                            "subNodes": [value.to_json()],
                        })
                    })
                    .collect();
                json!({"type": "object", "subNodes": elements})
            }
            Expression::Parameter(name) => json!({"type": "parameter", "name": name}),
        }
    }

    /// 从 AST 节点形式重建表达式，引用的变量注册到 `registry`
    pub fn from_json(value: &Value, registry: &mut VariableRegistry) -> PlanResult<Self> {
        let obj = as_object(value, "expression")?;
        let node_type = get_str(obj, "type")?;
        let sub_nodes = |registry: &mut VariableRegistry| -> PlanResult<Vec<Expression>> {
            get_array(obj, "subNodes")?
                .iter()
                .map(|n| Expression::from_json(n, registry))
                .collect()
        };

        match node_type {
            "value" => Ok(Expression::Literal(field(obj, "value")?.clone())),
            "reference" => Ok(Expression::Variable(
                registry.from_json(field(obj, "variable")?)?,
            )),
            "attribute access" => {
                let property = get_str(obj, "name")?.to_string();
                let object = single_sub_node(sub_nodes(registry)?, "attribute access")?;
                Ok(Expression::property(object, property))
            }
            "binary operator" => {
                let symbol = get_str(obj, "operator")?;
                let op = BinaryOperator::from_symbol(symbol).ok_or_else(|| {
                    PlanError::invalid_field("operator", format!("未知的操作符 {}", symbol))
                })?;
                let mut operands = sub_nodes(registry)?;
                if operands.len() != 2 {
                    return Err(PlanError::invalid_field("subNodes", "二元操作需要两个操作数"));
                }
                let right = operands.pop();
                let left = operands.pop();
                match (left, right) {
                    (Some(left), Some(right)) => Ok(Expression::binary(left, op, right)),
                    _ => Err(PlanError::invalid_field("subNodes", "二元操作需要两个操作数")),
                }
            }
            "function call" => Ok(Expression::function(
                get_str(obj, "name")?,
                sub_nodes(registry)?,
            )),
            "array" => Ok(Expression::List(sub_nodes(registry)?)),
            "object" => {
                let mut entries = Vec::new();
                for element in get_array(obj, "subNodes")? {
                    let element_obj = as_object(element, "object element")?;
                    if get_str(element_obj, "type")? != "object element" {
                        return Err(PlanError::invalid_field("subNodes", "应为 object element"));
                    }
                    let key = get_str(element_obj, "name")?.to_string();
                    let values = get_array(element_obj, "subNodes")?
                        .iter()
                        .map(|n| Expression::from_json(n, registry))
                        .collect::<PlanResult<Vec<_>>>()?;
                    entries.push((key, single_sub_node(values, "object element")?));
                }
                Ok(Expression::Map(entries))
            }
            "parameter" => Ok(Expression::Parameter(get_str(obj, "name")?.to_string())),
            other => Err(PlanError::invalid_field(
                "type",
                format!("未知的表达式类型 {}", other),
            )),
        }
    }
}

fn single_sub_node(mut nodes: Vec<Expression>, what: &str) -> PlanResult<Expression> {
    match (nodes.pop(), nodes.is_empty()) {
        (Some(node), true) => Ok(node),
        _ => Err(PlanError::invalid_field(
            "subNodes",
            format!("{} 需要恰好一个子节点", what),
        )),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Variable(var) => write!(f, "{}", var.name),
            Expression::Property { object, property } => write!(f, "{}.{}", object, property),
            Expression::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Expression::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Expression::Parameter(name) => write!(f, "@{}", name),
        }
    }
}
