//! TypeScript/JavaScript scanning over the Oxc AST.

use crate::template::{scan_template, TemplatePatterns};
use crate::text::{class_tokens, LineIndex};
use gridport_core::{
    is_column_binding, ApiCallUsage, ComponentAttribute, ComponentUsage, ConfigKind,
    ConfigProperty, ConfigUsage, ConfigValue, CssClassUsage, CssContext, Error, ImportKind,
    ImportUsage, ImportedName, Location, MappingRegistry, Result, UsageRecord,
};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, AssignmentExpression, AssignmentTarget, CallExpression, Expression,
    ImportDeclaration, ImportDeclarationSpecifier, JSXAttributeItem, JSXAttributeValue,
    JSXElement, ObjectExpression, ObjectProperty, ObjectPropertyKind, PropertyDefinition,
    PropertyKey, StringLiteral, TemplateLiteral, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::path::Path;

/// Parses one script file and appends every recognised construct to `record`.
///
/// Any parser diagnostic rejects the whole file, so a half-parsed file never
/// yields edits.
pub(crate) fn scan_script(
    path: &Path,
    source: &str,
    patterns: &TemplatePatterns,
    registry: &MappingRegistry,
    record: &mut UsageRecord,
) -> Result<()> {
    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts());
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            },
        });
    }

    let mut visitor = ScriptVisitor {
        source,
        index: LineIndex::new(source),
        registry,
        patterns,
        record,
        column_depth: 0,
    };
    visitor.visit_program(&ret.program);
    Ok(())
}

struct ScriptVisitor<'s, 'r> {
    source: &'s str,
    index: LineIndex,
    registry: &'r MappingRegistry,
    patterns: &'r TemplatePatterns,
    record: &'r mut UsageRecord,
    /// Non-zero while inside a column definition value; grid option
    /// detection is off there.
    column_depth: usize,
}

impl<'s> ScriptVisitor<'s, '_> {
    fn text(&self, span: Span) -> &'s str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn loc(&self, offset: u32) -> Location {
        self.index.location(offset as usize)
    }

    fn static_key(key: &PropertyKey<'_>, computed: bool) -> Option<String> {
        if computed {
            return None;
        }
        key.static_name().map(|name| name.to_string())
    }

    fn config_property(&self, prop: &ObjectProperty<'_>) -> Option<ConfigProperty> {
        let name = Self::static_key(&prop.key, prop.computed)?;
        let raw_text = self.text(prop.span);
        Some(ConfigProperty {
            name,
            key_text: self.text(prop.key.span()).to_string(),
            value: self.config_value(&prop.value),
            raw_text: raw_text.to_string(),
            location: self.loc(prop.key.span().start),
            multiline: raw_text.contains('\n'),
        })
    }

    /// Column binding declared outside an object literal (`columnDefs = [...]`).
    fn binding_property(
        &self,
        name: String,
        key_span: Span,
        value: &Expression<'_>,
    ) -> ConfigProperty {
        let raw_text = self.text(Span::new(key_span.start, value.span().end));
        ConfigProperty {
            name,
            key_text: self.text(key_span).to_string(),
            value: self.config_value(value),
            raw_text: raw_text.to_string(),
            location: self.loc(key_span.start),
            multiline: raw_text.contains('\n'),
        }
    }

    fn config_value(&self, expr: &Expression<'_>) -> ConfigValue {
        match expr {
            Expression::StringLiteral(s) => ConfigValue::String(s.value.to_string()),
            Expression::BooleanLiteral(b) => ConfigValue::Bool(b.value),
            Expression::NumericLiteral(n) => ConfigValue::Number(self.text(n.span).to_string()),
            Expression::ObjectExpression(obj) => ConfigValue::Object(self.object_properties(obj)),
            Expression::ArrayExpression(arr) => ConfigValue::Array(
                arr.elements
                    .iter()
                    .map(|element| self.array_element(element))
                    .collect(),
            ),
            other => ConfigValue::Expression(self.text(other.span()).to_string()),
        }
    }

    fn object_properties(&self, obj: &ObjectExpression<'_>) -> Vec<ConfigProperty> {
        obj.properties
            .iter()
            .filter_map(|p| match p {
                ObjectPropertyKind::ObjectProperty(prop) => self.config_property(prop),
                ObjectPropertyKind::SpreadProperty(_) => None,
            })
            .collect()
    }

    fn array_element(&self, element: &ArrayExpressionElement<'_>) -> ConfigValue {
        match element.as_expression() {
            Some(expr) => self.config_value(expr),
            None => ConfigValue::Expression(self.text(element.span()).to_string()),
        }
    }

    fn push_column_binding(&mut self, property: ConfigProperty) {
        self.record.configs.push(ConfigUsage {
            property,
            config_kind: ConfigKind::ColumnBinding,
        });
    }

    /// Class tokens inside a literal's source text.
    fn scan_literal_classes(&mut self, span: Span) {
        let text = self.text(span);
        for (offset, token) in class_tokens(text) {
            if self.registry.is_library_css_class(token) {
                let location = self.loc(span.start + offset as u32);
                self.record.css_classes.push(CssClassUsage {
                    location,
                    class_name: token.to_string(),
                    context: CssContext::Script,
                });
            }
        }
    }

    /// Hands an Angular inline `template:` to the template scanner.
    ///
    /// Returns false when the value is not a static string.
    fn scan_inline_template(&mut self, value: &Expression<'_>) -> bool {
        let span = match value {
            Expression::StringLiteral(s) => s.span,
            Expression::TemplateLiteral(t) if t.expressions.is_empty() => t.span,
            _ => return false,
        };
        if span.end - span.start < 2 {
            return false;
        }
        let start = span.start + 1;
        let content = self.text(Span::new(start, span.end - 1));
        let index = LineIndex::with_base(content, self.loc(start));
        scan_template(content, &index, self.patterns, self.registry, self.record);
        true
    }
}

/// Right-most identifier of a call receiver.
fn receiver_name(object: &Expression<'_>) -> Option<String> {
    match object {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => Some(member.property.name.to_string()),
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::ParenthesizedExpression(inner) => receiver_name(&inner.expression),
        _ => None,
    }
}

impl<'a> Visit<'a> for ScriptVisitor<'_, '_> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        let module_source = decl.source.value.as_str();
        if !self.registry.is_source_package(module_source) {
            return;
        }

        let mut imported_names = Vec::new();
        if let Some(specifiers) = &decl.specifiers {
            for specifier in specifiers {
                let name = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => ImportedName {
                        kind: ImportKind::Named,
                        imported: s.imported.name().to_string(),
                        local: s.local.name.to_string(),
                        type_only: s.import_kind.is_type(),
                        location: self.loc(s.span.start),
                    },
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportedName {
                        kind: ImportKind::Default,
                        imported: "default".to_string(),
                        local: s.local.name.to_string(),
                        type_only: false,
                        location: self.loc(s.span.start),
                    },
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportedName {
                        kind: ImportKind::Namespace,
                        imported: "*".to_string(),
                        local: s.local.name.to_string(),
                        type_only: false,
                        location: self.loc(s.span.start),
                    },
                };
                imported_names.push(name);
            }
        }

        self.record.imports.push(ImportUsage {
            location: self.loc(decl.span.start),
            module_source: module_source.to_string(),
            source_raw: self.text(decl.source.span).to_string(),
            source_location: self.loc(decl.source.span.start),
            imported_names,
            type_only: decl.import_kind.is_type(),
            raw_text: self.text(decl.span).to_string(),
        });
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::StaticMemberExpression(member) = &call.callee {
            let method = member.property.name.as_str();
            if let Some(receiver) = receiver_name(&member.object) {
                if self.registry.is_grid_api_call(&receiver, method) {
                    let args = call
                        .arguments
                        .iter()
                        .map(|arg| self.text(arg.span()).to_string())
                        .collect();
                    self.record.api_calls.push(ApiCallUsage {
                        location: self.loc(member.property.span.start),
                        receiver,
                        method_name: method.to_string(),
                        args,
                    });
                }
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        let Some(name) = Self::static_key(&prop.key, prop.computed) else {
            walk::walk_object_property(self, prop);
            return;
        };

        if name == "template" && self.scan_inline_template(&prop.value) {
            return;
        }

        if self.column_depth == 0 && self.registry.is_known_config_property(&name) {
            if let Some(property) = self.config_property(prop) {
                self.record.configs.push(ConfigUsage {
                    property,
                    config_kind: ConfigKind::GridOption,
                });
            }
        }

        if is_column_binding(&name) {
            self.column_depth += 1;
            walk::walk_object_property(self, prop);
            self.column_depth -= 1;
        } else {
            walk::walk_object_property(self, prop);
        }
    }

    fn visit_property_definition(&mut self, def: &PropertyDefinition<'a>) {
        let binding = Self::static_key(&def.key, def.computed)
            .filter(|name| is_column_binding(name))
            .zip(def.value.as_ref());

        match binding {
            Some((name, value)) if self.column_depth == 0 => {
                let property = self.binding_property(name, def.key.span(), value);
                self.push_column_binding(property);
                self.column_depth += 1;
                walk::walk_property_definition(self, def);
                self.column_depth -= 1;
            }
            _ => walk::walk_property_definition(self, def),
        }
    }

    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        let binding = decl
            .id
            .get_identifier_name()
            .map(|name| name.to_string())
            .filter(|name| is_column_binding(name))
            .zip(decl.init.as_ref());

        match binding {
            Some((name, init)) if self.column_depth == 0 => {
                let property = self.binding_property(name, decl.id.span(), init);
                self.push_column_binding(property);
                self.column_depth += 1;
                walk::walk_variable_declarator(self, decl);
                self.column_depth -= 1;
            }
            _ => walk::walk_variable_declarator(self, decl),
        }
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        let binding = match &assign.left {
            AssignmentTarget::StaticMemberExpression(member)
                if is_column_binding(member.property.name.as_str()) =>
            {
                Some((member.property.name.to_string(), member.property.span))
            }
            _ => None,
        };

        match binding {
            Some((name, key_span)) if self.column_depth == 0 => {
                let property = self.binding_property(name, key_span, &assign.right);
                self.push_column_binding(property);
                self.column_depth += 1;
                walk::walk_assignment_expression(self, assign);
                self.column_depth -= 1;
            }
            _ => walk::walk_assignment_expression(self, assign),
        }
    }

    fn visit_jsx_element(&mut self, element: &JSXElement<'a>) {
        let opening = &element.opening_element;
        let tag = self.text(opening.name.span());
        if self.registry.is_component_selector(tag) {
            let attributes = opening
                .attributes
                .iter()
                .filter_map(|item| match item {
                    JSXAttributeItem::Attribute(attr) => Some(ComponentAttribute {
                        name: self.text(attr.name.span()).to_string(),
                        value: attr.value.as_ref().map(|value| match value {
                            JSXAttributeValue::StringLiteral(s) => s.value.to_string(),
                            other => self.text(other.span()).to_string(),
                        }),
                        raw_text: self.text(attr.span).to_string(),
                        location: self.loc(attr.span.start),
                    }),
                    JSXAttributeItem::SpreadAttribute(_) => None,
                })
                .collect();

            let closing = element
                .closing_element
                .as_ref()
                .map(|closing| self.loc(closing.span.start));
            self.record.components.push(ComponentUsage {
                location: self.loc(opening.span.start),
                selector: tag.to_string(),
                attributes,
                raw_text: self.text(opening.span).to_string(),
                self_closing: element.closing_element.is_none(),
                closing,
            });
        }
        walk::walk_jsx_element(self, element);
    }

    fn visit_string_literal(&mut self, lit: &StringLiteral<'a>) {
        self.scan_literal_classes(lit.span);
    }

    fn visit_template_literal(&mut self, lit: &TemplateLiteral<'a>) {
        for quasi in &lit.quasis {
            self.scan_literal_classes(quasi.span);
        }
        walk::walk_template_literal(self, lit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> UsageRecord {
        let registry = MappingRegistry::builtin().unwrap();
        let patterns = TemplatePatterns::new(&registry).unwrap();
        let mut record = UsageRecord::new("src/app/grid.component.ts");
        scan_script(
            Path::new("src/app/grid.component.ts"),
            source,
            &patterns,
            &registry,
            &mut record,
        )
        .unwrap();
        record
    }

    #[test]
    fn test_imports() {
        let record = scan(
            "import { AgGridAngular, GridOptions as Opts } from 'ag-grid-angular';\n\
             import type { ColDef } from \"ag-grid-community\";\n\
             import * as grid from '@ag-grid-community/core';\n\
             import { Component } from '@angular/core';\n",
        );
        assert_eq!(record.imports.len(), 3);

        let first = &record.imports[0];
        assert_eq!(first.module_source, "ag-grid-angular");
        assert_eq!(first.source_raw, "'ag-grid-angular'");
        assert_eq!(first.location, Location::new(1, 1));
        assert_eq!(first.imported_names.len(), 2);
        assert!(first.imported_names[1].is_aliased());
        assert_eq!(
            first.raw_text,
            "import { AgGridAngular, GridOptions as Opts } from 'ag-grid-angular';"
        );

        assert!(record.imports[1].type_only);
        assert_eq!(record.imports[2].imported_names[0].kind, ImportKind::Namespace);
        assert_eq!(record.imports[2].imported_names[0].local, "grid");
    }

    #[test]
    fn test_subpath_imports() {
        let record = scan(
            "import 'ag-grid-community/styles/ag-grid.css';\n\
             import { ColDef } from 'ag-grid-community/dist/types';\n",
        );
        let sources: Vec<_> = record
            .imports
            .iter()
            .map(|i| i.module_source.as_str())
            .collect();
        assert_eq!(
            sources,
            vec!["ag-grid-community/styles/ag-grid.css", "ag-grid-community/dist/types"]
        );
        assert!(record.imports[0].imported_names.is_empty());
        assert_eq!(record.imports[1].location, Location::new(2, 1));
    }

    #[test]
    fn test_grid_options_and_columns() {
        let record = scan(
            "const gridOptions = {\n\
             \x20 rowData: rows,\n\
             \x20 enableRangeSelection: true,\n\
             \x20 columnDefs: [{ field: 'make', filter: 'agTextColumnFilter' }],\n\
             };\n",
        );
        let names: Vec<_> = record.configs.iter().map(|c| c.property_name()).collect();
        assert_eq!(names, vec!["rowData", "enableRangeSelection", "columnDefs"]);
        assert!(record
            .configs
            .iter()
            .all(|c| c.config_kind == ConfigKind::GridOption));
        assert_eq!(record.configs[0].location(), Location::new(2, 3));
        assert_eq!(
            record.configs[1].property.value,
            ConfigValue::Bool(true)
        );

        let ConfigValue::Array(columns) = &record.configs[2].property.value else {
            panic!("columnDefs should be an array");
        };
        let ConfigValue::Object(props) = &columns[0] else {
            panic!("column should be an object");
        };
        assert_eq!(props[1].name, "filter");
        assert_eq!(props[1].value.as_str(), Some("agTextColumnFilter"));
    }

    #[test]
    fn test_column_binding_class_property() {
        let record = scan(
            "export class GridComponent {\n\
             \x20 columnDefs: ColDef[] = [\n\
             \x20   { field: 'price', pagination: true },\n\
             \x20 ];\n\
             }\n",
        );
        // `pagination` inside a column definition is not a grid option
        assert_eq!(record.configs.len(), 1);
        let usage = &record.configs[0];
        assert_eq!(usage.config_kind, ConfigKind::ColumnBinding);
        assert_eq!(usage.property.key_text, "columnDefs");
        assert_eq!(usage.location(), Location::new(2, 3));
        assert!(usage.property.multiline);
    }

    #[test]
    fn test_api_calls() {
        let record = scan(
            "class A {\n\
             \x20 onGridReady(params) {\n\
             \x20   this.gridApi = params.api;\n\
             \x20   this.gridApi.sizeColumnsToFit();\n\
             \x20   this.gridApi.customThing(1, 'x');\n\
             \x20   this.http.get('/rows');\n\
             \x20 }\n\
             }\n",
        );
        let calls: Vec<_> = record
            .api_calls
            .iter()
            .map(|c| (c.receiver.as_str(), c.method_name.as_str()))
            .collect();
        assert_eq!(
            calls,
            vec![("gridApi", "sizeColumnsToFit"), ("gridApi", "customThing")]
        );
        assert_eq!(record.api_calls[1].args, vec!["1", "'x'"]);
        assert_eq!(record.api_calls[0].location, Location::new(4, 18));
    }

    #[test]
    fn test_script_classes_and_inline_template() {
        let record = scan(
            "@Component({\n\
             \x20 selector: 'app-grid',\n\
             \x20 template: `<ag-grid-angular class=\"ag-theme-alpine\" [rowData]=\"rows\"></ag-grid-angular>`,\n\
             })\n\
             export class GridComponent {\n\
             \x20 rowClass = 'ag-row-even highlighted';\n\
             }\n",
        );
        assert_eq!(record.components.len(), 1);
        let component = &record.components[0];
        assert_eq!(component.location, Location::new(3, 14));
        assert_eq!(component.closing, Some(Location::new(3, 72)));

        let classes: Vec<_> = record
            .css_classes
            .iter()
            .map(|c| (c.class_name.as_str(), c.context))
            .collect();
        assert_eq!(
            classes,
            vec![
                ("ag-theme-alpine", CssContext::Markup),
                ("ag-row-even", CssContext::Script),
            ]
        );
        assert_eq!(record.css_classes[1].location, Location::new(6, 15));
    }

    #[test]
    fn test_parse_error() {
        let registry = MappingRegistry::builtin().unwrap();
        let patterns = TemplatePatterns::new(&registry).unwrap();
        let mut record = UsageRecord::new("broken.ts");
        let result = scan_script(
            Path::new("broken.ts"),
            "import { from 'ag-grid-angular'\nconst = ;",
            &patterns,
            &registry,
            &mut record,
        );
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}
