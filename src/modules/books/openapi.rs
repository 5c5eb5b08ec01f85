//! OpenAPI fragment for the books routes.

use serde_json::{json, Value};

fn apikey_parameter() -> Value {
    json!({
        "in": "query",
        "name": "apikey",
        "required": true,
        "description": "The api key.",
        "schema": { "type": "string" }
    })
}

fn isbn_parameter() -> Value {
    json!({
        "in": "path",
        "name": "isbn",
        "required": true,
        "description": "The isbn13 of the book.",
        "schema": { "type": "string" }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn error_responses() -> Value {
    json!({
        "401": json_response("Missing or invalid API key", schema_ref("ErrorResponse")),
        "404": json_response("Storage fault", schema_ref("ErrorResponse"))
    })
}

fn with_errors(mut responses: Value) -> Value {
    if let (Some(target), Value::Object(errors)) = (responses.as_object_mut(), error_responses()) {
        for (status, response) in errors {
            target.entry(status).or_insert(response);
        }
    }
    responses
}

fn request_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": { "schema": schema_ref(schema) }
        }
    })
}

/// Paths and schemas contributed by the books module.
pub fn fragment() -> Value {
    let collection = json!({
        "get": {
            "summary": "Get all the books",
            "tags": ["Books"],
            "parameters": [apikey_parameter()],
            "responses": with_errors(json!({
                "200": json_response("The list of books, sorted by isbn13", schema_ref("BookList"))
            }))
        },
        "post": {
            "summary": "Add a book",
            "tags": ["Books"],
            "parameters": [apikey_parameter()],
            "requestBody": request_body("Book"),
            "responses": with_errors(json!({
                "200": json_response("The book was added", schema_ref("StatusMessage")),
                "404": json_response(
                    "A book with this isbn13 already exists (status 1) or storage fault",
                    schema_ref("StatusMessage")
                ),
                "422": json_response("Malformed book payload", schema_ref("ErrorResponse"))
            }))
        }
    });

    let resource = json!({
        "get": {
            "summary": "Get one of the books",
            "tags": ["Books"],
            "parameters": [isbn_parameter(), apikey_parameter()],
            "responses": with_errors(json!({
                "200": json_response(
                    "Every book carrying the isbn13",
                    json!({ "type": "array", "items": schema_ref("Book") })
                )
            }))
        },
        "put": {
            "summary": "Update one of the books",
            "tags": ["Books"],
            "parameters": [isbn_parameter(), apikey_parameter()],
            "requestBody": request_body("BookChanges"),
            "responses": with_errors(json!({
                "200": json_response("The update was applied", schema_ref("StatusMessage")),
                "422": json_response("Malformed book payload", schema_ref("ErrorResponse"))
            }))
        },
        "delete": {
            "summary": "Delete one of the books",
            "tags": ["Books"],
            "parameters": [isbn_parameter(), apikey_parameter()],
            "responses": with_errors(json!({
                "200": json_response("The delete was applied", schema_ref("StatusMessage"))
            }))
        }
    });

    let book_properties = json!({
        "title": { "type": "string", "description": "The title of the book." },
        "isbn13": { "type": "string", "description": "The isbn13 of the book." },
        "details": { "type": "string", "description": "The details of the book." },
        "publisher": { "type": "string", "description": "The publisher of the book." },
        "year": { "type": "integer", "description": "The year the book was published." },
        "price": { "type": "number", "description": "The price of the book." }
    });

    let mut change_properties = book_properties.clone();
    if let Some(properties) = change_properties.as_object_mut() {
        properties.remove("isbn13");
    }

    json!({
        "paths": {
            "/books/": collection,
            "/books/{isbn}/": resource
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": book_properties,
                    "required": ["title", "isbn13", "details", "publisher", "year", "price"],
                    "example": {
                        "title": "The Best Book Ever",
                        "isbn13": "2348957489354",
                        "details": "A really, really good book",
                        "publisher": "Good Book Productions",
                        "year": 2021,
                        "price": 3.5
                    }
                },
                "BookChanges": {
                    "type": "object",
                    "properties": change_properties,
                    "required": ["title", "details", "publisher", "year", "price"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "total": { "type": "integer" },
                        "books": { "type": "array", "items": schema_ref("Book") }
                    },
                    "required": ["total", "books"]
                },
                "StatusMessage": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "integer", "description": "0 on success, 1 on conflict" },
                        "message": { "type": "string" }
                    },
                    "required": ["status", "message"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_documents_auth_failure() {
        let spec = fragment();
        for (path, methods) in spec["paths"].as_object().unwrap() {
            for (method, operation) in methods.as_object().unwrap() {
                assert!(
                    operation["responses"]["401"].is_object(),
                    "{method} {path} lacks a 401 response"
                );
            }
        }
    }

    #[test]
    fn duplicate_create_keeps_its_own_404_description() {
        let spec = fragment();
        let description = &spec["paths"]["/books/"]["post"]["responses"]["404"]["description"];
        assert!(description.as_str().unwrap().contains("already exists"));
    }

    #[test]
    fn changes_schema_omits_isbn() {
        let spec = fragment();
        let properties = &spec["components"]["schemas"]["BookChanges"]["properties"];
        assert!(properties.get("isbn13").is_none());
        assert!(properties.get("title").is_some());
    }
}
